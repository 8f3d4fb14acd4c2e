use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::foundation::error::{PixcacheError, PixcacheResult};
use crate::role::fingerprint::{SpecFingerprint, fingerprint_spec};
use crate::role::spec::RoleSpec;

/// Which roles reuse another role's image.
///
/// Built once per configuration load. Every alias maps directly to its final owner; owners never
/// map to anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct AliasPlan {
    owners: BTreeMap<u32, u32>,
}

impl AliasPlan {
    /// Owner whose image `role` reuses, if `role` is an alias.
    pub(crate) fn owner_of(&self, role: u32) -> Option<u32> {
        self.owners.get(&role).copied()
    }

    /// Aliases of `owner`, ascending.
    pub(crate) fn dependents_of(&self, owner: u32) -> SmallVec<[u32; 4]> {
        self.owners
            .iter()
            .filter(|(_alias, o)| **o == owner)
            .map(|(alias, _o)| *alias)
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.owners.len()
    }
}

/// Compute the alias plan for a full configuration.
///
/// Declared aliases must name a configured role and must not form cycles. A declared alias is
/// honored when both ends can share an image and have the same recipe; otherwise the role is
/// generated independently. Shareable roles with identical recipes that declare nothing are
/// merged onto the lowest role id.
pub(crate) fn plan_aliases(specs: &BTreeMap<u32, RoleSpec>) -> PixcacheResult<AliasPlan> {
    for (id, spec) in specs {
        if let Some(target) = spec.alias_of
            && !specs.contains_key(&target)
        {
            return Err(PixcacheError::configuration(format!(
                "role {id} aliases unknown role {target}"
            )));
        }
    }
    detect_cycles(specs)?;

    let mut owners = BTreeMap::new();
    for (id, spec) in specs {
        let Some(target) = spec.alias_of else {
            continue;
        };
        let root = declared_root(specs, *id);
        let honored = specs
            .get(&root)
            .is_some_and(|owner| spec.is_shareable() && spec.same_recipe(owner));
        if honored {
            owners.insert(*id, root);
        } else {
            tracing::warn!(
                role = id,
                target,
                "alias target does not share an image with this role; generating independently"
            );
        }
    }

    // Undeclared duplicates, grouped by digest and confirmed field by field.
    let mut groups: BTreeMap<SpecFingerprint, SmallVec<[u32; 2]>> = BTreeMap::new();
    let mut merged = BTreeMap::new();
    for (id, spec) in specs {
        if owners.contains_key(id) || !spec.is_shareable() {
            continue;
        }
        let leaders = groups.entry(fingerprint_spec(spec)).or_default();
        let leader = leaders
            .iter()
            .copied()
            .find(|l| specs.get(l).is_some_and(|ls| ls.same_recipe(spec)));
        match leader {
            Some(leader) => {
                merged.insert(*id, leader);
            }
            None => leaders.push(*id),
        }
    }

    for owner in owners.values_mut() {
        if let Some(leader) = merged.get(owner) {
            *owner = *leader;
        }
    }
    owners.extend(merged);

    if !owners.is_empty() {
        tracing::debug!(aliases = owners.len(), "planned role aliases");
    }
    Ok(AliasPlan { owners })
}

fn declared_root(specs: &BTreeMap<u32, RoleSpec>, start: u32) -> u32 {
    let mut cur = start;
    // Bounded by the role count; cycles are rejected before this runs.
    for _ in 0..=specs.len() {
        match specs.get(&cur).and_then(|s| s.alias_of) {
            Some(next) => cur = next,
            None => break,
        }
    }
    cur
}

fn detect_cycles(specs: &BTreeMap<u32, RoleSpec>) -> PixcacheResult<()> {
    for start in specs.keys() {
        let mut path: Vec<u32> = vec![*start];
        let mut cur = *start;
        while let Some(next) = specs.get(&cur).and_then(|s| s.alias_of) {
            if let Some(pos) = path.iter().position(|r| *r == next) {
                return Err(PixcacheError::AliasCycle {
                    roles: path[pos..].to_vec(),
                });
            }
            path.push(next);
            cur = next;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/role/alias.rs"]
mod tests;
