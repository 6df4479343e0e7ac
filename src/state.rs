use bevy::ecs::schedule::{IntoSystemDescriptor, StateData};
use bevy::prelude::*;

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum GameState {
    /// Category files are being loaded
    Loading,
    /// Players pick categories and how many they are
    Setup,
    /// Turns are being played, including pause and end of turn screens
    Playing,
    /// Final ranking
    Results,
}

pub trait EasySystemSetCtor {
    fn on_update<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet;
    fn on_enter<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet;
    fn on_exit<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet;
}
impl<St: StateData> EasySystemSetCtor for St {
    fn on_update<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet {
        SystemSet::on_update(self).with_system(system)
    }
    fn on_exit<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet {
        SystemSet::on_exit(self).with_system(system)
    }
    fn on_enter<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet {
        SystemSet::on_enter(self).with_system(system)
    }
}
