use aidroute_primitives::HandlerId;

/// User and foreground-app preferences consulted during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
	/// Handler preferred by the app currently in the foreground.
	pub foreground: Option<HandlerId>,
	/// Handler selected as the tap-and-pay default.
	pub payment: Option<HandlerId>,
}

impl Preferences {
	pub fn new(foreground: Option<HandlerId>, payment: Option<HandlerId>) -> Self {
		Self { foreground, payment }
	}

	#[inline]
	pub fn is_foreground(&self, handler: &HandlerId) -> bool {
		self.foreground.as_ref() == Some(handler)
	}

	#[inline]
	pub fn is_payment(&self, handler: &HandlerId) -> bool {
		self.payment.as_ref() == Some(handler)
	}
}
