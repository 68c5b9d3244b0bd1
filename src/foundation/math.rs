pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// One premultiplied RGBA8 pixel composited over an opaque background color.
pub(crate) fn over_background(px: &[u8], bg: [u8; 4]) -> [u8; 4] {
    let inv = 255 - u16::from(px[3]);
    let ch = |c: usize| (u16::from(px[c]) + mul_div255_u16(u16::from(bg[c]), inv)).min(255) as u8;
    [ch(0), ch(1), ch(2), 255]
}

/// Linear blend of two u8 channels with `t` in [0,1], rounded to nearest.
///
/// `t == 0` returns `a` exactly.
pub(crate) fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    let v = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
    v.round().clamp(0.0, 255.0) as u8
}

/// Byte length of a tightly packed RGBA8 buffer, or `None` on overflow.
pub(crate) fn rgba8_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}
