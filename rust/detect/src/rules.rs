// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type-based pair exemptions.
//!
//! Building models legitimately contain overlapping elements: a wall and
//! the opening cut into it, an opening and the door that fills it. The
//! rules table decides, from two type names alone, whether a pair is worth
//! testing at all.

use rustc_hash::FxHashSet;

/// Canonical unordered pair of type names.
///
/// `(A, B)` and `(B, A)` construct the same key, so symmetric lookups in
/// the ignore table need no double bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    first: String,
    second: String,
}

impl Combination {
    /// Creates the canonical combination of two type names.
    pub fn new(type_a: impl Into<String>, type_b: impl Into<String>) -> Self {
        let a = type_a.into();
        let b = type_b.into();
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }
}

/// Immutable exemption tables consulted before any geometric work.
///
/// Constructed once per session and passed explicitly into the detector;
/// nothing here mutates during a scan.
#[derive(Debug, Clone)]
pub struct ClashRules {
    self_only: FxHashSet<String>,
    ignored: FxHashSet<Combination>,
}

impl ClashRules {
    /// Rules with no exemptions; every type pair is checked.
    pub fn empty() -> Self {
        Self {
            self_only: FxHashSet::default(),
            ignored: FxHashSet::default(),
        }
    }

    /// Marks a type as compared only against elements of the same type.
    pub fn with_self_only(mut self, ifc_type: impl Into<String>) -> Self {
        self.self_only.insert(ifc_type.into());
        self
    }

    /// Marks a type pair as structurally expected to overlap; such pairs
    /// are never reported.
    pub fn with_ignored(
        mut self,
        type_a: impl Into<String>,
        type_b: impl Into<String>,
    ) -> Self {
        self.ignored.insert(Combination::new(type_a, type_b));
        self
    }

    /// Decides whether a pair of type names should be tested.
    ///
    /// Self-only types are compared only with exact same-type peers, and
    /// ignored combinations are rejected outright. Symmetric in its
    /// arguments.
    pub fn should_check(&self, type_a: &str, type_b: &str) -> bool {
        if (self.self_only.contains(type_a) || self.self_only.contains(type_b))
            && type_a != type_b
        {
            return false;
        }
        if self.ignored.contains(&Combination::new(type_a, type_b)) {
            return false;
        }
        true
    }
}

impl Default for ClashRules {
    /// The standard exemptions for IFC building models.
    ///
    /// Spatial containers are only meaningful against their own kind;
    /// walls, slabs, openings, windows, and doors overlap by construction.
    fn default() -> Self {
        Self::empty()
            .with_self_only("IfcSpace")
            .with_self_only("IfcSite")
            .with_ignored("IfcWall", "IfcOpeningElement")
            .with_ignored("IfcWallStandardCase", "IfcOpeningElement")
            .with_ignored("IfcSlab", "IfcOpeningElement")
            .with_ignored("IfcWall", "IfcWindow")
            .with_ignored("IfcWallStandardCase", "IfcWindow")
            .with_ignored("IfcWall", "IfcDoor")
            .with_ignored("IfcWallStandardCase", "IfcDoor")
            .with_ignored("IfcOpeningElement", "IfcWindow")
            .with_ignored("IfcOpeningElement", "IfcDoor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_is_unordered() {
        assert_eq!(
            Combination::new("IfcWall", "IfcDoor"),
            Combination::new("IfcDoor", "IfcWall")
        );

        let mut set = FxHashSet::default();
        set.insert(Combination::new("IfcWall", "IfcDoor"));
        assert!(set.contains(&Combination::new("IfcDoor", "IfcWall")));
    }

    #[test]
    fn should_check_is_symmetric() {
        let rules = ClashRules::default();
        let types = [
            "IfcWall",
            "IfcWallStandardCase",
            "IfcDoor",
            "IfcWindow",
            "IfcOpeningElement",
            "IfcSlab",
            "IfcSpace",
            "IfcSite",
            "IfcBeam",
        ];
        for a in &types {
            for b in &types {
                assert_eq!(
                    rules.should_check(a, b),
                    rules.should_check(b, a),
                    "asymmetric result for ({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn self_only_types_reject_other_types() {
        let rules = ClashRules::default();
        assert!(!rules.should_check("IfcSpace", "IfcWall"));
        assert!(!rules.should_check("IfcBeam", "IfcSite"));
        assert!(rules.should_check("IfcSpace", "IfcSpace"));
        assert!(rules.should_check("IfcSite", "IfcSite"));
    }

    #[test]
    fn ignored_combinations_are_rejected() {
        let rules = ClashRules::default();
        assert!(!rules.should_check("IfcWall", "IfcOpeningElement"));
        assert!(!rules.should_check("IfcOpeningElement", "IfcWall"));
        assert!(!rules.should_check("IfcDoor", "IfcWallStandardCase"));
        assert!(!rules.should_check("IfcWindow", "IfcOpeningElement"));
    }

    #[test]
    fn unrelated_pairs_are_checked() {
        let rules = ClashRules::default();
        assert!(rules.should_check("IfcWall", "IfcWall"));
        assert!(rules.should_check("IfcWall", "IfcBeam"));
        assert!(rules.should_check("IfcDoor", "IfcWindow"));
        assert!(rules.should_check("IfcSlab", "IfcWall"));
    }

    #[test]
    fn empty_rules_check_everything() {
        let rules = ClashRules::empty();
        assert!(rules.should_check("IfcSpace", "IfcWall"));
        assert!(rules.should_check("IfcWall", "IfcOpeningElement"));
    }

    #[test]
    fn builder_extends_tables() {
        let rules = ClashRules::empty()
            .with_self_only("IfcRoof")
            .with_ignored("IfcColumn", "IfcFooting");
        assert!(!rules.should_check("IfcRoof", "IfcWall"));
        assert!(rules.should_check("IfcRoof", "IfcRoof"));
        assert!(!rules.should_check("IfcFooting", "IfcColumn"));
    }
}
