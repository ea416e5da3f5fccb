use crate::records::{normalize_school_name, Role, User};

/// Picks the representative principal for a school.
///
/// The backing store tolerates duplicate and stale principal records, so this is a
/// heuristic: active records win over inactive ones, then the record with the most merged
/// evidence keys, then the first one encountered.
pub fn select_best_principal<'a>(users: &'a [User], school: &str) -> Option<&'a User> {
    let target = normalize_school_name(school);
    if target.is_empty() {
        return None;
    }

    let candidates: Vec<&User> = users
        .iter()
        .filter(|user| user.role == Role::Principal && user.belongs_to(&target))
        .collect();

    match candidates.len() {
        0 => None,
        1 => Some(candidates[0]),
        _ => {
            let active: Vec<&User> = candidates.iter().copied().filter(|user| user.active).collect();
            let preferred = if active.is_empty() { candidates } else { active };

            let mut best: Option<&User> = None;
            for candidate in preferred {
                let better = match best {
                    Some(current) => {
                        candidate.workload_evidence.len() > current.workload_evidence.len()
                    }
                    None => true,
                };
                if better {
                    best = Some(candidate);
                }
            }
            best
        }
    }
}
