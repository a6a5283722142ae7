use tracing::info;
use uuid::Uuid;

use finperiod_domain::{PeriodStartDay, User};

use crate::{
    storage::{require_user, UserStore},
    CoreError,
};

/// Per-user settings that shape period resolution.
pub struct PreferenceService;

impl PreferenceService {
    /// Sets the day of month on which the user's periods begin (1..=28).
    ///
    /// Existing budgets keep their period; only later resolutions change.
    pub fn set_period_start_day(
        users: &dyn UserStore,
        user_id: Uuid,
        day: u32,
    ) -> Result<User, CoreError> {
        let start_day = PeriodStartDay::new(day)?;
        let mut user = require_user(users, user_id)?;
        if user.period_start_day == start_day {
            return Ok(user);
        }
        let previous = user.period_start_day;
        user.set_period_start_day(start_day);
        users.save_user(&user)?;
        info!(user = %user.id, %previous, current = %start_day, "period start day changed");
        Ok(user)
    }

    pub fn period_start_day(
        users: &dyn UserStore,
        user_id: Uuid,
    ) -> Result<PeriodStartDay, CoreError> {
        Ok(require_user(users, user_id)?.period_start_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn start_day_round_trips_through_the_store() {
        let store = MemoryStore::new();
        let user = User::new("Rui");
        store.save_user(&user).unwrap();
        assert_eq!(
            PreferenceService::period_start_day(&store, user.id).unwrap(),
            PeriodStartDay::default()
        );

        let updated = PreferenceService::set_period_start_day(&store, user.id, 25).unwrap();
        assert_eq!(updated.period_start_day.get(), 25);
        assert_eq!(
            PreferenceService::period_start_day(&store, user.id).unwrap().get(),
            25
        );
    }

    #[test]
    fn out_of_range_days_are_rejected() {
        let store = MemoryStore::new();
        let user = User::new("Rui");
        store.save_user(&user).unwrap();
        for day in [0, 29, 31] {
            assert!(matches!(
                PreferenceService::set_period_start_day(&store, user.id, day),
                Err(CoreError::InvalidPeriodStartDay(d)) if d == day
            ));
        }
        assert!(matches!(
            PreferenceService::set_period_start_day(&store, Uuid::new_v4(), 3),
            Err(CoreError::UserNotFound(_))
        ));
    }
}
