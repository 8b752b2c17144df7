use std::ops::RangeInclusive;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("SessionId({_0})")]
pub struct SessionId(u64);

#[cfg(test)]
impl From<u64> for SessionId {
	fn from(id: u64) -> Self {
		SessionId(id)
	}
}

pub struct SessionIdSequence {
	id_pool: RangeInclusive<u64>,
}

impl Default for SessionIdSequence {
	fn default() -> Self {
		Self { id_pool: 0..=u64::MAX }
	}
}

impl SessionIdSequence {
	pub fn next(&mut self) -> SessionId {
		SessionId(self.id_pool.next().expect("Ran out of available SessionIds."))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn session_id_sequence_should_increment() {
		let mut sequence = SessionIdSequence::default();
		assert_eq!(SessionId::from(0), sequence.next());
		assert_eq!(SessionId::from(1), sequence.next());
		assert_eq!(SessionId::from(2), sequence.next());
	}
}
