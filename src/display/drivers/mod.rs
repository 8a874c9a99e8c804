pub mod console;
#[cfg(feature = "hardware")]
pub mod max7219;
pub mod mock;

pub use console::ConsoleDriver;
#[cfg(feature = "hardware")]
pub use max7219::Max7219Driver;
pub use mock::MockDriver;
