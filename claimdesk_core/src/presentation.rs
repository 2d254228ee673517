use std::convert::Infallible;

use crate::claim::AttestedClaim;

pub trait CreatePresentation {
    type Error: std::fmt::Display;

    fn create_presentation(
        &self,
        attested_claim: &AttestedClaim,
        excluded_properties: &[String],
    ) -> Result<AttestedClaim, Self::Error>;
}

/// Drops the excluded properties from the claim contents and leaves the attestation intact.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedactingPresenter;

impl CreatePresentation for RedactingPresenter {
    type Error = Infallible;

    fn create_presentation(
        &self,
        attested_claim: &AttestedClaim,
        excluded_properties: &[String],
    ) -> Result<AttestedClaim, Self::Error> {
        let mut presentation = attested_claim.clone();

        presentation
            .request
            .claim
            .contents
            .retain(|name, _| !excluded_properties.contains(name));

        Ok(presentation)
    }
}
