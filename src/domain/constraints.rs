//! Cross-field surgical constraints.
//!
//! Tumor location limits the surgical procedures that can be performed, and
//! the procedure limits the reconstruction. The form uses these tables to
//! restrict its choices; validation re-checks them so an inconsistent record
//! never reaches the feature builder.

use crate::domain::Category;
use crate::RfsError;

/// Procedures that are legal for a tumor location label.
#[must_use]
pub fn allowed_procedures(location: &str) -> &'static [&'static str] {
    match location {
        // Esophagogastric junction: distal gastrectomy is not an option.
        "EG" => &["TG", "PG"],
        "L" | "M" => &["DG", "TG"],
        _ => &["DG", "TG", "PG"],
    }
}

/// Reconstructions that are legal after a procedure label.
#[must_use]
pub fn allowed_reconstructions(procedure: &str) -> &'static [&'static str] {
    match procedure {
        "PG" => &["Other"],
        "TG" => &["R-Y", "Other"],
        _ => &["B-1", "B-2", "R-Y", "Other"],
    }
}

/// Check location → procedure → reconstruction consistency.
///
/// # Errors
/// Returns `RfsError::InvalidCombination` naming the first offending pair.
pub fn check_surgical_combination(
    location: Category,
    procedure: Category,
    reconstruction: Category,
) -> Result<(), RfsError> {
    if !allowed_procedures(location.label()).contains(&procedure.label()) {
        return Err(RfsError::InvalidCombination {
            first: location.field().name(),
            second: procedure.field().name(),
            detail: format!(
                "procedure {} is not performed for tumor location {}",
                procedure, location
            ),
        });
    }

    if !allowed_reconstructions(procedure.label()).contains(&reconstruction.label()) {
        return Err(RfsError::InvalidCombination {
            first: procedure.field().name(),
            second: reconstruction.field().name(),
            detail: format!(
                "reconstruction {} is not valid after {}",
                reconstruction, procedure
            ),
        });
    }

    Ok(())
}
