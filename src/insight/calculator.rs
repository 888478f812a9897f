//! Energy, macro and strength formulas

use crate::{
  entity::{ActivityLevel, Gender, Goal, GoalSpeed},
  prelude::*,
};

/// Everything `compute_targets` needs from a profile
#[derive(Debug, Clone, Copy)]
pub struct ProfileInput {
  pub gender: Gender,
  pub age: i32,
  pub height_cm: i32,
  pub weight_kg: Decimal,
  pub activity: ActivityLevel,
  pub goal: Goal,
  pub goal_speed: GoalSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSet {
  pub bmr: i32,
  pub tdee: i32,
  pub target_calories: i32,
  pub protein_g: i32,
  pub fat_g: i32,
  pub carbs_g: i32,
  /// Positive for a deficit, negative for a surplus
  pub deficit_pct: Decimal,
}

pub fn activity_factor(level: ActivityLevel) -> Decimal {
  match level {
    ActivityLevel::Sedentary => dec!(1.2),
    ActivityLevel::Light => dec!(1.375),
    ActivityLevel::Moderate => dec!(1.55),
    ActivityLevel::High => dec!(1.725),
    ActivityLevel::VeryHigh => dec!(1.9),
  }
}

fn goal_multiplier(goal: Goal) -> Decimal {
  match goal {
    Goal::Recomp => dec!(0.93),
    Goal::Cut => dec!(0.85),
    Goal::Bulk => dec!(1.10),
  }
}

fn speed_adjustment(speed: GoalSpeed) -> Decimal {
  match speed {
    GoalSpeed::Gentle => dec!(0.5),
    GoalSpeed::Standard => dec!(1.0),
    GoalSpeed::Aggressive => dec!(1.5),
  }
}

fn to_i32(value: Decimal) -> i32 {
  value.trunc().try_into().unwrap_or(i32::MAX)
}

/// Mifflin-St Jeor, truncated toward zero
pub fn compute_bmr(
  gender: Gender,
  weight_kg: Decimal,
  height_cm: i32,
  age: i32,
) -> i32 {
  let base = dec!(10) * weight_kg + dec!(6.25) * Decimal::from(height_cm)
    - dec!(5) * Decimal::from(age);

  let bmr = match gender {
    Gender::Male => base + dec!(5),
    Gender::Female => base - dec!(161),
  };
  to_i32(bmr)
}

pub fn compute_tdee(bmr: i32, activity: ActivityLevel) -> i32 {
  to_i32(Decimal::from(bmr) * activity_factor(activity))
}

/// Calorie multiplier after scaling the goal's base deficit or surplus by
/// the chosen speed.
pub fn effective_multiplier(goal: Goal, speed: GoalSpeed) -> Decimal {
  let base = goal_multiplier(goal);
  let speed = speed_adjustment(speed);

  match goal {
    Goal::Recomp | Goal::Cut => Decimal::ONE - (Decimal::ONE - base) * speed,
    Goal::Bulk => Decimal::ONE + (base - Decimal::ONE) * speed,
  }
}

pub fn compute_targets(profile: &ProfileInput) -> TargetSet {
  let bmr = compute_bmr(
    profile.gender,
    profile.weight_kg,
    profile.height_cm,
    profile.age,
  );
  let tdee = compute_tdee(bmr, profile.activity);

  let multiplier = effective_multiplier(profile.goal, profile.goal_speed);
  let target_calories = to_i32(Decimal::from(tdee) * multiplier);
  let deficit_pct = (Decimal::ONE - multiplier) * dec!(100);

  let protein_g = to_i32(dec!(2.0) * profile.weight_kg);
  let fat_g = to_i32(dec!(0.9) * profile.weight_kg);

  let remaining = target_calories - protein_g * 4 - fat_g * 9;
  let carbs_g = remaining.div_euclid(4).max(0);

  TargetSet {
    bmr,
    tdee,
    target_calories,
    protein_g,
    fat_g,
    carbs_g,
    deficit_pct,
  }
}

/// Epley estimate. A single rep is the max itself, not `w * (1 + 1/30)`.
pub fn compute_estimated_1rm(weight_kg: Decimal, reps: i32) -> Decimal {
  if reps == 1 {
    return weight_kg;
  }
  weight_kg * (Decimal::ONE + Decimal::from(reps) / Decimal::from(30))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(goal: Goal, speed: GoalSpeed) -> ProfileInput {
    ProfileInput {
      gender: Gender::Male,
      age: 30,
      height_cm: 180,
      weight_kg: dec!(85),
      activity: ActivityLevel::Moderate,
      goal,
      goal_speed: speed,
    }
  }

  #[test]
  fn test_bmr_mifflin_st_jeor() {
    // 850 + 1125 - 150
    assert_eq!(compute_bmr(Gender::Male, dec!(85), 180, 30), 1830);
    assert_eq!(compute_bmr(Gender::Female, dec!(85), 180, 30), 1664);
    // 10*60.5 + 6.25*165 - 5*41 - 161 = 1270.25
    assert_eq!(compute_bmr(Gender::Female, dec!(60.5), 165, 41), 1270);
  }

  #[test]
  fn test_bmr_monotonic() {
    for gender in [Gender::Male, Gender::Female] {
      let base = compute_bmr(gender, dec!(70), 170, 35);
      assert!(compute_bmr(gender, dec!(71), 170, 35) > base);
      assert!(compute_bmr(gender, dec!(70), 171, 35) > base);
      assert!(compute_bmr(gender, dec!(70), 170, 36) < base);
    }
  }

  #[test]
  fn test_tdee_factors() {
    assert_eq!(compute_tdee(1830, ActivityLevel::Sedentary), 2196);
    assert_eq!(compute_tdee(1830, ActivityLevel::Moderate), 2836);
    assert_eq!(compute_tdee(1000, ActivityLevel::VeryHigh), 1900);
    assert_eq!(ActivityLevel::parse_lossy("couch"), ActivityLevel::Sedentary);
    assert_eq!(ActivityLevel::parse_lossy("HIGH"), ActivityLevel::High);
  }

  #[test]
  fn test_effective_multiplier_is_symmetric() {
    assert_eq!(effective_multiplier(Goal::Cut, GoalSpeed::Standard), dec!(0.85));
    assert_eq!(effective_multiplier(Goal::Cut, GoalSpeed::Gentle), dec!(0.925));
    assert_eq!(
      effective_multiplier(Goal::Recomp, GoalSpeed::Aggressive),
      dec!(0.895)
    );
    assert_eq!(effective_multiplier(Goal::Bulk, GoalSpeed::Gentle), dec!(1.05));
    assert_eq!(
      effective_multiplier(Goal::Bulk, GoalSpeed::Aggressive),
      dec!(1.15)
    );
  }

  #[test]
  fn test_targets_for_cut() {
    let targets = compute_targets(&profile(Goal::Cut, GoalSpeed::Standard));

    assert_eq!(targets.bmr, 1830);
    assert_eq!(targets.tdee, 2836);
    assert_eq!(targets.target_calories, 2410);
    assert_eq!(targets.protein_g, 170);
    assert_eq!(targets.fat_g, 76);
    // 2410 - 680 - 684 = 1046
    assert_eq!(targets.carbs_g, 261);
    assert_eq!(targets.deficit_pct, dec!(15));
  }

  #[test]
  fn test_surplus_has_negative_deficit() {
    let targets = compute_targets(&profile(Goal::Bulk, GoalSpeed::Standard));
    assert!(targets.deficit_pct < Decimal::ZERO);
    assert!(targets.target_calories > targets.tdee);
  }

  #[test]
  fn test_macro_split_fits_calories() {
    let goals = [Goal::Recomp, Goal::Cut, Goal::Bulk];
    let speeds = [GoalSpeed::Gentle, GoalSpeed::Standard, GoalSpeed::Aggressive];

    for goal in goals {
      for speed in speeds {
        for weight in [dec!(45), dec!(85.5), dec!(150)] {
          let mut input = profile(goal, speed);
          input.weight_kg = weight;
          input.activity = ActivityLevel::Sedentary;
          let t = compute_targets(&input);

          assert!(t.carbs_g >= 0);
          if t.carbs_g > 0 {
            assert!(
              t.protein_g * 4 + t.fat_g * 9 + t.carbs_g * 4 <= t.target_calories
            );
          }
        }
      }
    }
  }

  #[test]
  fn test_carbs_floor_at_zero() {
    let input = ProfileInput {
      gender: Gender::Female,
      age: 70,
      height_cm: 150,
      weight_kg: dec!(150),
      activity: ActivityLevel::Sedentary,
      goal: Goal::Cut,
      goal_speed: GoalSpeed::Aggressive,
    };
    assert_eq!(compute_targets(&input).carbs_g, 0);
  }

  #[test]
  fn test_e1rm() {
    assert_eq!(compute_estimated_1rm(dec!(100), 1), dec!(100));
    assert_eq!(compute_estimated_1rm(dec!(102.5), 1), dec!(102.5));
    assert_eq!(compute_estimated_1rm(dec!(100), 5).round_dp(2), dec!(116.67));
    assert_eq!(compute_estimated_1rm(dec!(60), 10).round_dp(2), dec!(80));

    let mut previous = compute_estimated_1rm(dec!(80), 1);
    for reps in 2..=20 {
      let next = compute_estimated_1rm(dec!(80), reps);
      assert!(next > previous);
      previous = next;
    }
  }

  #[test]
  fn test_e1rm_increases_with_reps_for_light_weights() {
    for weight in [dec!(0.1), dec!(0.25), dec!(1.5)] {
      let mut previous = compute_estimated_1rm(weight, 1);
      for reps in 2..=100 {
        let next = compute_estimated_1rm(weight, reps);
        assert!(next > previous, "{weight} kg x {reps}");
        previous = next;
      }
    }
  }
}
