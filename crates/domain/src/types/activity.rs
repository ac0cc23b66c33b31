//! Qualifying input activity

use serde::{Deserialize, Serialize};

use crate::impl_wire_name;

/// Input event kinds that count as user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    /// Every kind that resets the idle threshold.
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::PointerDown,
        ActivityKind::PointerMove,
        ActivityKind::KeyDown,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
    ];
}

impl_wire_name!(ActivityKind {
    PointerDown => "pointer_down",
    PointerMove => "pointer_move",
    KeyDown => "key_down",
    Scroll => "scroll",
    TouchStart => "touch_start",
    Click => "click",
});
