pub mod console;
pub mod html;
pub mod junit;
pub mod view_model;
