mod carousel;
mod command_overlay;
mod grid;
mod modal;

pub use carousel::Carousel;
pub use command_overlay::draw_command_overlay;
pub use grid::VirtualizedGrid;
pub use modal::{Modal, ModalContent};
