pub mod cms;
pub mod html;
pub mod pages;
pub mod tech;

pub use pages::{PageProber, RobotsInfo, SitemapInfo};
