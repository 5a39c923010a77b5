//! Partition image resolution and A/B slot handling
//!
//! Images are discovered purely by name: partition `foo` is flashed from
//! `foo.img` in the image directory. Slot expansion decides per partition
//! whether one target or one per slot is written.

mod resolver;
mod slot;

pub use resolver::{image_file_name, image_path, resolve, Resolution};
pub use slot::{flash_targets, Slot, SlotMode};
