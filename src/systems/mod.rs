mod clock;
mod interaction;
mod movement;
mod survival;

pub use clock::ClockSystem;
pub use interaction::InteractionSystem;
pub use movement::MovementSystem;
pub use survival::SurvivalSystem;
