mod button;
mod noise;
mod sd_storage;
mod serial_link;
mod tick_clock;

pub use button::Button;
pub use noise::seed_from_noise;
pub use sd_storage::SdStorage;
pub use serial_link::SerialLink;
pub use tick_clock::TickClock;
