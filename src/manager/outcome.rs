// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Result of an aggregator mutation.

use crate::error::Warning;

/// What happened to a mutation.
///
/// Mutations never fail. A mutation that could not be applied leaves the
/// collection unchanged and says why.
///
/// # Examples
///
/// ```
/// use espdash_lib::error::Warning;
/// use espdash_lib::manager::{DeviceAggregator, Outcome};
///
/// let aggregator = DeviceAggregator::new();
/// let outcome = aggregator.rename_device("ghost", "Ghost");
///
/// assert_eq!(outcome, Outcome::Ignored(Warning::UnknownDevice("ghost".to_string())));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation was applied.
    Applied,
    /// The mutation was dropped.
    Ignored(Warning),
}

impl Outcome {
    /// Returns `true` if the mutation was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Returns the reason the mutation was dropped.
    #[must_use]
    pub fn warning(&self) -> Option<&Warning> {
        match self {
            Self::Applied => None,
            Self::Ignored(warning) => Some(warning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_has_no_warning() {
        assert!(Outcome::Applied.is_applied());
        assert!(Outcome::Applied.warning().is_none());
    }

    #[test]
    fn ignored_carries_warning() {
        let outcome = Outcome::Ignored(Warning::DuplicateDevice("d1".to_string()));
        assert!(!outcome.is_applied());
        assert_eq!(
            outcome.warning(),
            Some(&Warning::DuplicateDevice("d1".to_string()))
        );
    }
}
