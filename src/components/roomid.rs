use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Room an entity is in.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u32);
