//! Power and screen states under which a routing entry is active.

use std::fmt;

bitflags::bitflags! {
	/// Power/screen-state mask attached to a routing table entry.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
	pub struct PowerState: u8 {
		/// Device switched on.
		const SWITCH_ON = 0x01;
		/// Device switched off.
		const SWITCH_OFF = 0x02;
		/// Battery exhausted.
		const BATTERY_OFF = 0x04;
		/// Screen on while the device is locked.
		const SCREEN_ON_LOCKED = 0x40;
		/// Screen off.
		const SCREEN_OFF = 0x80;

		/// Every switch state a handler may declare.
		const ALL_SWITCH = Self::SWITCH_ON.bits() | Self::SWITCH_OFF.bits() | Self::BATTERY_OFF.bits();
	}
}

impl PowerState {
	/// Default mask for identifiers routed to the host for disambiguation.
	pub const HOST_DEFAULT: PowerState = PowerState::SWITCH_ON.union(PowerState::SCREEN_ON_LOCKED);
}

impl fmt::Display for PowerState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:02x}", self.bits())
	}
}
