use crate::arm::{DoseClass, dose_class};
use crate::error::Result;
use crate::policy::Policy;
use crate::trial::{Features, feature};

/// Clinical dosing algorithm
///
/// Evaluates the published linear model for the square root of the weekly
/// dose from age, height, weight, race and interacting medications, then
/// classifies the squared result.
#[derive(Clone, Debug, Default)]
pub struct ClinicalDosing;

impl ClinicalDosing {
    /// Square root of the predicted weekly dose (mg/week).
    pub fn sqrt_weekly_dose(features: &Features) -> Result<f64> {
        let age_in_decades = feature(features, "Age in decades")?;
        let height = feature(features, "Height (cm)")?;
        let weight = feature(features, "Weight (kg)")?;
        let asian = feature(features, "Asian")?;
        let black = feature(features, "Black")?;
        let white = feature(features, "White")?;
        let enzyme_inducer = feature(features, "Carbamazepine (Tegretol)")?
            .max(feature(features, "Phenytoin (Dilantin)")?)
            .max(feature(features, "Rifampin or Rifampicin")?);
        let amiodarone = feature(features, "Amiodarone (Cordarone)")?;

        // Missing or mixed race is whatever is not Asian, Black or White.
        let other_race = 1.0 - asian.max(black).max(white);

        Ok(4.0376 - 0.2546 * age_in_decades + 0.0118 * height + 0.0134 * weight
            - 0.6752 * asian
            + 0.4060 * black
            + 0.0443 * other_race
            + 1.2799 * enzyme_inducer
            - 0.5695 * amiodarone)
    }

    /// Predicted weekly dose (mg/week).
    pub fn weekly_dose(features: &Features) -> Result<f64> {
        Ok(Self::sqrt_weekly_dose(features)?.powi(2))
    }
}

impl Policy for ClinicalDosing {
    fn name(&self) -> &str {
        "Clinical"
    }

    fn choose(&mut self, features: &Features, _rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        Ok(dose_class(Self::weekly_dose(features)?))
    }

    fn update(&mut self, _features: &Features, _arm: DoseClass, _reward: f64) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) {}
}
