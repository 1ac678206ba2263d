/// The collaborators the feeder drives.
///
/// # Type Parameters
///
/// - `S`: [Storage](crate::Storage) holding the programs.
/// - `L`: [ControllerLink](crate::ControllerLink) to the motion controller.
/// - `C`: [Clock](crate::Clock).
/// - `W`: debug sink ([ufmt::uWrite]).
pub struct Board<S, L, C, W> {
    pub storage: S,
    pub link: L,
    pub clock: C,
    pub log: W,
}
