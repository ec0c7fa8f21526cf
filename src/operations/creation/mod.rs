mod make_box;
mod make_prism;

pub use make_box::MakeBox;
pub use make_prism::MakePrism;
