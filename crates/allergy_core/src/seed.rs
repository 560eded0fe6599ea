//! Reference allergen set for first-run demos and manual testing.

use crate::model::allergy::{AllergyInput, DangerLevel};
use crate::repo::allergy_repo::{AllergyRepository, RepoError, RepoResult};
use log::info;

/// Counters for one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub added: usize,
    /// Entries whose name was already present.
    pub skipped: usize,
}

/// Returns the ten common allergens shipped as sample data.
pub fn sample_allergies() -> Vec<AllergyInput> {
    vec![
        AllergyInput::new("Peanuts", DangerLevel::LifeThreatening)
            .with_symptoms(
                "Anaphylaxis, difficulty breathing, swelling of face and throat, hives, rapid pulse",
            )
            .with_ingredients(
                "Peanut oil, peanut flour, peanut butter, groundnuts, arachis oil, mixed nuts",
            )
            .with_notes(
                "Carry EpiPen at all times. Avoid all products processed in facilities that handle peanuts.",
            ),
        AllergyInput::new("Milk", DangerLevel::Moderate)
            .with_symptoms("Stomach pain, bloating, diarrhea, nausea, gas")
            .with_ingredients("Lactose, casein, whey, butter, cream, cheese, yogurt, milk powder")
            .with_notes("Lactose-free alternatives available. Severity varies with amount consumed."),
        AllergyInput::new("Shellfish", DangerLevel::Severe)
            .with_symptoms("Hives, vomiting, difficulty swallowing, abdominal pain, dizziness")
            .with_ingredients("Shrimp, crab, lobster, crawfish, mollusks, oysters, clams, mussels")
            .with_notes(
                "Cross-contamination risk high in seafood restaurants. Often develops in adulthood.",
            ),
        AllergyInput::new("Tree Nuts", DangerLevel::LifeThreatening)
            .with_symptoms("Anaphylaxis, swelling, difficulty breathing, skin reactions")
            .with_ingredients(
                "Almonds, walnuts, pecans, cashews, pistachios, brazil nuts, hazelnuts, macadamia nuts",
            )
            .with_notes(
                "Different tree nuts may cause different severities. Some people allergic to only specific nuts.",
            ),
        AllergyInput::new("Eggs", DangerLevel::Moderate)
            .with_symptoms("Skin rash, stomach upset, respiratory problems, runny nose")
            .with_ingredients(
                "Albumin, egg whites, egg yolks, mayonnaise, meringue, custard, lecithin",
            )
            .with_notes(
                "Often outgrown by adolescence. Some people can tolerate baked eggs but not raw.",
            ),
        AllergyInput::new("Soy", DangerLevel::Mild)
            .with_symptoms("Mild stomach upset, skin irritation, runny nose")
            .with_ingredients("Soy sauce, tofu, tempeh, soy milk, soy protein, edamame, miso")
            .with_notes("Common in processed foods. Often mild reactions. Check labels carefully."),
        AllergyInput::new("Wheat", DangerLevel::Moderate)
            .with_symptoms("Digestive issues, skin problems, respiratory symptoms, headache")
            .with_ingredients("Wheat flour, gluten, bread, pasta, cereals, crackers, beer")
            .with_notes(
                "Different from celiac disease. May be able to tolerate other grains like rice and corn.",
            ),
        AllergyInput::new("Fish", DangerLevel::Severe)
            .with_symptoms("Hives, swelling, gastrointestinal problems, respiratory issues")
            .with_ingredients(
                "Salmon, tuna, cod, halibut, anchovies, fish sauce, worcestershire sauce",
            )
            .with_notes(
                "May be allergic to specific types of fish only. Cross-contamination risk in restaurants.",
            ),
        AllergyInput::new("Sesame", DangerLevel::Severe)
            .with_symptoms("Anaphylaxis, hives, difficulty breathing, gastrointestinal symptoms")
            .with_ingredients("Sesame seeds, tahini, sesame oil, hummus, halva, some bread toppings")
            .with_notes(
                "Increasingly recognized allergen. Now required to be labeled in many countries.",
            ),
        AllergyInput::new("Strawberries", DangerLevel::Mild)
            .with_symptoms("Oral allergy syndrome, mild hives, itchy mouth and throat")
            .with_ingredients("Fresh strawberries, strawberry flavoring, strawberry jam, smoothies")
            .with_notes(
                "Often part of oral allergy syndrome. May be related to birch pollen allergy.",
            ),
    ]
}

/// Inserts the sample set, skipping names that already exist.
///
/// # Errors
/// Stops at the first storage error other than a name collision.
pub fn seed_sample_allergies<R>(repo: &R) -> RepoResult<SeedSummary>
where
    R: AllergyRepository + ?Sized,
{
    let mut summary = SeedSummary::default();
    for input in sample_allergies() {
        match repo.create_allergy(&input) {
            Ok(_) => summary.added += 1,
            Err(RepoError::DuplicateName(_)) => summary.skipped += 1,
            Err(err) => return Err(err),
        }
    }

    info!(
        "event=seed_finish module=seed status=ok added={} skipped={}",
        summary.added, summary.skipped
    );
    Ok(summary)
}
