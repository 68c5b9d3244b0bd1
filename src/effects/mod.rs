pub mod blur;
pub mod bokeh;
pub mod parallax;
