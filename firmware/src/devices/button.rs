use arduino_hal::port::{
    mode::{Input, PullUp},
    Pin, PinOps,
};
use patternfeed::SwitchState;

/// Operator button, or any contact that pulls the input to ground.
///
/// # Type Parameters
///
/// - `P`: pin
pub struct Button<P> {
    pin: Pin<Input<PullUp>, P>,
}
impl<P: PinOps> Button<P> {
    /// Creates a new `Button`.
    ///
    /// # Parameters
    ///
    /// - `pin`: Pin to use for the button, with its pull-up enabled.
    pub fn new(pin: Pin<Input<PullUp>, P>) -> Self {
        Self { pin }
    }
}

/// The pulled-up pin reads low while the contact is closed.
impl<P: PinOps> patternfeed::Switch for Button<P> {
    fn read_switch_state(&self) -> SwitchState {
        if self.pin.is_low() {
            SwitchState::Pressed
        } else {
            SwitchState::Released
        }
    }
}
