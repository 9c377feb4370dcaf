//! Effective-access resolution for one principal and bucket.
//!
//! The resolver is a pure computation over grant data the caller has already
//! fetched. Rules are evaluated in strict order, first match wins:
//!
//! 1. A privileged role (owner or admin) gets full access to every operation.
//! 2. Read: a standing write grant covering the bucket gives full access; an
//!    approved, unexpired request gives limited access with its expiry
//!    attached; standing access wins when both apply.
//! 3. Write: standing write scope covering the bucket, or an approved
//!    unexpired request. Temporary grants confer read and write together.
//! 4. Delete: standing write scope covering the bucket plus the standing
//!    delete flag. Temporary grants never confer delete.
//!
//! Expiry is compared live against the supplied clock on every call; there is
//! no persisted "expired" state and no background sweep. Revoked and denied
//! requests are ignored outright, regardless of any remaining expiry time.

use chrono::{DateTime, Utc};
use s3commander_core::Role;
use s3commander_domain::{AccessLevel, AccessRequest, BucketAccess, BucketName, PermanentGrant};

/// Grant data for one principal, fetched once and evaluated as a unit.
///
/// Callers needing a consistent decision across several operations must reuse
/// one snapshot; concurrent grant mutations are not linearized against
/// resolver calls.
#[derive(Debug, Clone, Default)]
pub struct GrantSnapshot {
    /// The principal's standing grant, if one is stored.
    pub permanent: Option<PermanentGrant>,
    /// The principal's access requests for the bucket under evaluation.
    pub requests: Vec<AccessRequest>,
}

/// Computes the effective access decision for one principal and bucket.
///
/// Absence of grants is a valid all-deny decision, never an error. The
/// function is pure: identical inputs always produce identical decisions.
#[must_use]
pub fn resolve(
    role: Role,
    bucket: &BucketName,
    snapshot: &GrantSnapshot,
    now: DateTime<Utc>,
) -> BucketAccess {
    if role.is_privileged() {
        return BucketAccess::full();
    }

    let absent = PermanentGrant::default();
    let permanent = snapshot.permanent.as_ref().unwrap_or(&absent);
    let standing_write = permanent.allows_write(bucket);

    let mut has_active_request = false;
    let mut unbounded = false;
    let mut latest_expiry: Option<DateTime<Utc>> = None;

    for request in &snapshot.requests {
        if request.bucket != *bucket || !request.is_active(now) {
            continue;
        }

        has_active_request = true;
        match request.expires_at {
            None => unbounded = true,
            Some(expires_at) => {
                latest_expiry = Some(latest_expiry.map_or(expires_at, |latest| latest.max(expires_at)));
            }
        }
    }

    let level = if standing_write {
        AccessLevel::Full
    } else if has_active_request {
        AccessLevel::Limited {
            expires_at: if unbounded { None } else { latest_expiry },
        }
    } else {
        AccessLevel::None
    };

    BucketAccess {
        level,
        can_write: standing_write || has_active_request,
        can_delete: permanent.allows_delete(bucket),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, Duration, Utc};
    use s3commander_core::{AppResult, Role};
    use s3commander_domain::{
        AccessLevel, AccessRequest, BucketName, Operation, PermanentGrant, WriteAccessMode,
    };

    use super::{GrantSnapshot, resolve};

    fn bucket(name: &str) -> AppResult<BucketName> {
        BucketName::new(name)
    }

    fn approved_request(
        bucket: &BucketName,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> AppResult<AccessRequest> {
        let mut request = AccessRequest::submit(
            "alice",
            "Alice Doe",
            None,
            bucket.clone(),
            "eu-central-1",
            "incident investigation access",
            now,
        )?;
        request.approve("admin", duration_minutes, now)?;
        Ok(request)
    }

    fn selective_grant(buckets: &[&str], can_delete: bool) -> PermanentGrant {
        PermanentGrant {
            write_access: WriteAccessMode::Selective,
            buckets: buckets.iter().map(|name| (*name).to_owned()).collect(),
            can_delete,
        }
    }

    #[test]
    fn privileged_roles_bypass_all_grant_data() -> AppResult<()> {
        let target = bucket("any-bucket")?;
        let now = Utc::now();

        // A hostile snapshot: revoked request, no permanent grant.
        let mut request = approved_request(&target, 60, now)?;
        request.revoke("admin", "rotated credentials", now)?;
        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![request],
        };

        for role in [Role::Owner, Role::Admin] {
            let access = resolve(role, &target, &snapshot, now);
            assert!(access.allows(Operation::Read));
            assert!(access.allows(Operation::Write));
            assert!(access.allows(Operation::Delete));
        }
        Ok(())
    }

    #[test]
    fn no_grants_means_no_access() -> AppResult<()> {
        let access = resolve(
            Role::User,
            &bucket("b1")?,
            &GrantSnapshot::default(),
            Utc::now(),
        );
        assert_eq!(access.level, AccessLevel::None);
        assert!(!access.can_write);
        assert!(!access.can_delete);
        Ok(())
    }

    #[test]
    fn all_mode_writes_to_every_bucket_and_delete_follows_flag() -> AppResult<()> {
        let now = Utc::now();
        for can_delete in [false, true] {
            let snapshot = GrantSnapshot {
                permanent: Some(PermanentGrant {
                    write_access: WriteAccessMode::All,
                    buckets: BTreeSet::new(),
                    can_delete,
                }),
                requests: Vec::new(),
            };
            let access = resolve(Role::User, &bucket("any-name-at-all")?, &snapshot, now);
            assert_eq!(access.level, AccessLevel::Full);
            assert!(access.can_write);
            assert_eq!(access.can_delete, can_delete);
        }
        Ok(())
    }

    #[test]
    fn selective_mode_is_scoped_to_its_bucket_set() -> AppResult<()> {
        let now = Utc::now();
        let snapshot = GrantSnapshot {
            permanent: Some(selective_grant(&["b1"], false)),
            requests: Vec::new(),
        };

        let granted = resolve(Role::User, &bucket("b1")?, &snapshot, now);
        assert_eq!(granted.level, AccessLevel::Full);
        assert!(granted.can_write);

        let other = resolve(Role::User, &bucket("b2")?, &snapshot, now);
        assert_eq!(other.level, AccessLevel::None);
        assert!(!other.can_write);
        Ok(())
    }

    #[test]
    fn approved_request_grants_limited_read_and_write_but_never_delete() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let request = approved_request(&target, 60, now)?;
        let expires_at = request.expires_at;

        // Delete stays off even with the standing delete flag set, because the
        // flag only rides on standing write scope for the same bucket.
        let snapshot = GrantSnapshot {
            permanent: Some(selective_grant(&["other-bucket"], true)),
            requests: vec![request],
        };

        let access = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(access.level, AccessLevel::Limited { expires_at });
        assert!(access.can_write);
        assert!(!access.can_delete);
        Ok(())
    }

    #[test]
    fn approved_request_stops_counting_once_the_clock_passes_expiry() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![approved_request(&target, 60, now)?],
        };

        let before = resolve(Role::User, &target, &snapshot, now + Duration::minutes(59));
        assert!(before.allows(Operation::Read));
        assert!(before.can_write);

        let after = resolve(Role::User, &target, &snapshot, now + Duration::minutes(61));
        assert_eq!(after.level, AccessLevel::None);
        assert!(!after.can_write);
        Ok(())
    }

    #[test]
    fn revocation_preempts_remaining_expiry_time() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let mut request = approved_request(&target, 60, now)?;
        request.revoke("admin", "access no longer needed", now)?;

        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![request],
        };
        let access = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(access.level, AccessLevel::None);
        assert!(!access.can_write);
        Ok(())
    }

    #[test]
    fn standing_grant_wins_over_an_active_request_for_read_level() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let snapshot = GrantSnapshot {
            permanent: Some(selective_grant(&["b1"], false)),
            requests: vec![approved_request(&target, 60, now)?],
        };

        let access = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(access.level, AccessLevel::Full);
        Ok(())
    }

    #[test]
    fn only_active_requests_count_among_many() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();

        let expired = approved_request(&target, 30, now - Duration::hours(2))?;
        let mut denied = AccessRequest::submit(
            "alice",
            "Alice Doe",
            None,
            target.clone(),
            "eu-central-1",
            "second request for the same bucket",
            now,
        )?;
        denied.deny("admin", "duplicate of an earlier request", now)?;
        let active = approved_request(&target, 60, now)?;
        let active_expiry = active.expires_at;

        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![expired, denied, active],
        };

        let access = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(
            access.level,
            AccessLevel::Limited {
                expires_at: active_expiry
            }
        );
        Ok(())
    }

    #[test]
    fn latest_expiry_is_reported_when_several_requests_are_active() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let short = approved_request(&target, 30, now)?;
        let long = approved_request(&target, 120, now)?;
        let long_expiry = long.expires_at;

        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![long, short],
        };
        let access = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(
            access.level,
            AccessLevel::Limited {
                expires_at: long_expiry
            }
        );
        Ok(())
    }

    #[test]
    fn requests_for_other_buckets_are_ignored() -> AppResult<()> {
        let now = Utc::now();
        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![approved_request(&bucket("b1")?, 60, now)?],
        };

        let access = resolve(Role::User, &bucket("b2")?, &snapshot, now);
        assert_eq!(access.level, AccessLevel::None);
        Ok(())
    }

    #[test]
    fn pending_requests_grant_nothing() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let pending = AccessRequest::submit(
            "alice",
            "Alice Doe",
            None,
            target.clone(),
            "eu-central-1",
            "still waiting for review",
            now,
        )?;

        let snapshot = GrantSnapshot {
            permanent: None,
            requests: vec![pending],
        };
        let access = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(access.level, AccessLevel::None);
        assert!(!access.can_write);
        Ok(())
    }

    #[test]
    fn identical_inputs_resolve_identically() -> AppResult<()> {
        let target = bucket("b1")?;
        let now = Utc::now();
        let snapshot = GrantSnapshot {
            permanent: Some(selective_grant(&["b1"], true)),
            requests: vec![approved_request(&target, 60, now)?],
        };

        let first = resolve(Role::User, &target, &snapshot, now);
        let second = resolve(Role::User, &target, &snapshot, now);
        assert_eq!(first, second);
        Ok(())
    }
}
