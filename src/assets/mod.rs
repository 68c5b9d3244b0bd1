pub(crate) mod decode;
pub(crate) mod depth_image;
