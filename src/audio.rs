use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_kira_audio::{Audio, AudioChannel as KiraChannel, AudioPlugin, AudioSource};
use enum_map::{enum_map, EnumMap};

use crate::turn::Cue;

struct SfxChannel {
    channel: KiraChannel,
    volume: f32,
    muted: bool,
}
impl Default for SfxChannel {
    fn default() -> Self {
        Self { channel: KiraChannel::new("sfx".to_owned()), volume: 0.5, muted: false }
    }
}
impl SfxChannel {
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

struct AudioAssets {
    cues: EnumMap<Cue, Handle<AudioSource>>,
}
impl FromWorld for AudioAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.get_resource::<AssetServer>().unwrap();
        Self { cues: enum_map! { cue => assets.load(&cue_path(cue)) } }
    }
}

fn cue_path(cue: Cue) -> String {
    format!("sfx/{cue:?}.wav")
}

/// Fire and forget sound requests. A sound that fails to load or play only
/// leaves the game silent.
pub enum AudioRequest {
    Cue(Cue),
    ToggleMute,
}
fn play_audio(
    assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut sfx: ResMut<SfxChannel>,
    mut events: EventReader<AudioRequest>,
) {
    for event in events.iter() {
        match event {
            AudioRequest::Cue(cue) => {
                audio.play_in_channel(assets.cues[*cue].clone(), &sfx.channel);
            }
            AudioRequest::ToggleMute => {
                sfx.muted = !sfx.muted;
                audio.set_volume_in_channel(sfx.effective_volume(), &sfx.channel);
            }
        }
    }
}

fn init_volume(audio: Res<Audio>, sfx: Res<SfxChannel>) {
    audio.set_volume_in_channel(sfx.effective_volume(), &sfx.channel);
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(AudioPlugin)
            .init_resource::<SfxChannel>()
            .init_resource::<AudioAssets>()
            .add_event::<AudioRequest>()
            .add_startup_system(init_volume)
            .add_system(play_audio);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn every_cue_has_a_sound_file() {
        let paths = enum_map! { cue => cue_path(cue) };
        for path in paths.values() {
            let file = Path::new("assets").join(path);
            assert!(file.exists(), "{} is missing", file.display());
        }
    }

    #[test]
    fn mute_silences_the_channel() {
        let mut sfx = SfxChannel::default();
        assert_eq!(sfx.effective_volume(), 0.5);
        sfx.muted = true;
        assert_eq!(sfx.effective_volume(), 0.0);
    }
}
