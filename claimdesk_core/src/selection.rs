use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{
    claim::{AttestedClaim, CTypeHash, ClaimEntry},
    presentation::CreatePresentation,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no claim entry with id {0}")]
    UnknownEntry(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CTypeFilter {
    Any,
    Only(Vec<CTypeHash>),
}

impl CTypeFilter {
    pub fn from_hashes(hashes: Vec<CTypeHash>) -> Self {
        if hashes.is_empty() {
            CTypeFilter::Any
        } else {
            CTypeFilter::Only(hashes)
        }
    }

    pub fn admits(&self, hash: &CTypeHash) -> bool {
        match self {
            CTypeFilter::Any => true,
            CTypeFilter::Only(hashes) => hashes.contains(hash),
        }
    }
}

impl From<Option<CTypeHash>> for CTypeFilter {
    fn from(hash: Option<CTypeHash>) -> Self {
        Self::from_hashes(hash.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClaimGroup<'a> {
    pub ctype_hash: CTypeHash,
    pub entries: Vec<&'a ClaimEntry>,
}

pub fn group_by_ctype<'a>(entries: &'a [ClaimEntry], filter: &CTypeFilter) -> Vec<ClaimGroup<'a>> {
    let mut groups: Vec<ClaimGroup<'a>> = vec![];

    for entry in entries.iter().filter(|entry| filter.admits(entry.ctype_hash())) {
        match groups
            .iter_mut()
            .find(|group| &group.ctype_hash == entry.ctype_hash())
        {
            Some(group) => group.entries.push(entry),
            None => groups.push(ClaimGroup {
                ctype_hash: entry.ctype_hash().clone(),
                entries: vec![entry],
            }),
        }
    }

    groups
}

// `all_*` flags are resolved against the entry when the payload is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimSelection {
    pub is_selected: bool,
    pub selected_properties: BTreeSet<String>,
    pub selected_attested_claims: BTreeSet<String>,
    pub all_properties: bool,
    pub all_attested_claims: bool,
}

impl Default for ClaimSelection {
    fn default() -> Self {
        Self {
            is_selected: false,
            selected_properties: BTreeSet::new(),
            selected_attested_claims: BTreeSet::new(),
            all_properties: true,
            all_attested_claims: true,
        }
    }
}

impl ClaimSelection {
    pub fn resolved_properties(&self, entry: &ClaimEntry) -> BTreeSet<String> {
        entry
            .claim
            .property_names()
            .filter(|name| self.all_properties || self.selected_properties.contains(*name))
            .cloned()
            .collect()
    }

    pub fn resolved_attested_claims<'a>(&self, entry: &'a ClaimEntry) -> Vec<&'a AttestedClaim> {
        entry
            .selectable_attested_claims()
            .filter(|attested| {
                self.all_attested_claims
                    || self.selected_attested_claims.contains(attested.claim_hash())
            })
            .collect()
    }

    pub fn excluded_properties(&self, entry: &ClaimEntry) -> Vec<String> {
        let selected = self.resolved_properties(entry);

        entry
            .claim
            .property_names()
            .filter(|name| !selected.contains(*name))
            .cloned()
            .collect()
    }

    pub fn contributes(&self, entry: &ClaimEntry) -> bool {
        self.is_selected
            && !self.resolved_properties(entry).is_empty()
            && !self.resolved_attested_claims(entry).is_empty()
    }
}

// Never mutated in place; every change produces a new map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contributions(BTreeMap<String, ClaimSelection>);

impl Contributions {
    pub fn change_selection(&self, entry: &ClaimEntry, selection: &ClaimSelection) -> Self {
        let mut next = self.0.clone();

        if selection.contributes(entry) {
            next.insert(entry.id.clone(), selection.clone());
        } else {
            next.remove(&entry.id);
        }

        Self(next)
    }

    pub fn get(&self, entry_id: &str) -> Option<&ClaimSelection> {
        self.0.get(entry_id)
    }

    pub fn contains(&self, entry_id: &str) -> bool {
        self.0.contains_key(entry_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Clone, Debug)]
pub struct ClaimSelector {
    filter: CTypeFilter,
    entries: Vec<ClaimEntry>,
    drafts: BTreeMap<String, ClaimSelection>,
    contributions: Contributions,
}

impl ClaimSelector {
    pub fn new(entries: &[ClaimEntry], filter: CTypeFilter) -> Self {
        let mut selector = Self {
            filter,
            entries: vec![],
            drafts: BTreeMap::new(),
            contributions: Contributions::default(),
        };

        selector.replace_entries(entries);

        selector
    }

    pub fn filter(&self) -> &CTypeFilter {
        &self.filter
    }

    pub fn entries(&self) -> &[ClaimEntry] {
        &self.entries
    }

    pub fn groups(&self) -> Vec<ClaimGroup<'_>> {
        group_by_ctype(&self.entries, &self.filter)
    }

    pub fn has_relevant_claims(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn selection(&self, entry_id: &str) -> Option<&ClaimSelection> {
        self.drafts.get(entry_id)
    }

    pub fn contributions(&self) -> &Contributions {
        &self.contributions
    }

    pub fn replace_entries(&mut self, entries: &[ClaimEntry]) {
        self.entries = entries
            .iter()
            .filter(|entry| self.filter.admits(entry.ctype_hash()))
            .cloned()
            .collect();

        let mut drafts = BTreeMap::new();
        let mut contributions = Contributions::default();
        for entry in &self.entries {
            let draft = self.drafts.remove(&entry.id).unwrap_or_default();
            contributions = contributions.change_selection(entry, &draft);
            drafts.insert(entry.id.clone(), draft);
        }

        self.drafts = drafts;
        self.contributions = contributions;
    }

    pub fn select(&mut self, entry_id: &str) -> Result<(), SelectionError> {
        self.update(entry_id, |draft, _| draft.is_selected = true)
    }

    pub fn deselect(&mut self, entry_id: &str) -> Result<(), SelectionError> {
        self.update(entry_id, |draft, _| draft.is_selected = false)
    }

    pub fn toggle_property(
        &mut self,
        entry_id: &str,
        property: &str,
    ) -> Result<(), SelectionError> {
        self.update(entry_id, |draft, entry| {
            if draft.all_properties {
                draft.selected_properties = entry.claim.property_names().cloned().collect();
                draft.all_properties = false;
            }

            let offered = entry.claim.contents.contains_key(property);

            if !draft.selected_properties.remove(property) && offered {
                draft.selected_properties.insert(property.to_owned());
            }
        })
    }

    pub fn toggle_attested_claim(
        &mut self,
        entry_id: &str,
        claim_hash: &str,
    ) -> Result<(), SelectionError> {
        self.update(entry_id, |draft, entry| {
            if draft.all_attested_claims {
                draft.selected_attested_claims = entry
                    .selectable_attested_claims()
                    .map(|attested| attested.claim_hash().to_owned())
                    .collect();
                draft.all_attested_claims = false;
            }

            let offered = entry
                .selectable_attested_claims()
                .any(|attested| attested.claim_hash() == claim_hash);

            if !draft.selected_attested_claims.remove(claim_hash) && offered {
                draft.selected_attested_claims.insert(claim_hash.to_owned());
            }
        })
    }

    pub fn set_all_properties(&mut self, entry_id: &str, all: bool) -> Result<(), SelectionError> {
        self.update(entry_id, |draft, _| {
            draft.all_properties = all;
            if !all {
                draft.selected_properties.clear();
            }
        })
    }

    pub fn set_all_attested_claims(
        &mut self,
        entry_id: &str,
        all: bool,
    ) -> Result<(), SelectionError> {
        self.update(entry_id, |draft, _| {
            draft.all_attested_claims = all;
            if !all {
                draft.selected_attested_claims.clear();
            }
        })
    }

    fn update<F>(&mut self, entry_id: &str, change: F) -> Result<(), SelectionError>
    where
        F: FnOnce(&mut ClaimSelection, &ClaimEntry),
    {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| SelectionError::UnknownEntry(entry_id.to_owned()))?;
        let draft = self
            .drafts
            .get_mut(entry_id)
            .ok_or_else(|| SelectionError::UnknownEntry(entry_id.to_owned()))?;

        change(draft, entry);

        self.contributions = self.contributions.change_selection(entry, draft);

        Ok(())
    }

    pub fn build_disclosure<P: CreatePresentation>(
        &self,
        presenter: &P,
    ) -> Result<Vec<AttestedClaim>, P::Error> {
        let mut presentations = vec![];

        for entry in &self.entries {
            let Some(selection) = self.contributions.get(&entry.id) else {
                continue;
            };
            if !selection.contributes(entry) {
                continue;
            }

            let excluded = selection.excluded_properties(entry);
            for attested in selection.resolved_attested_claims(entry) {
                presentations.push(presenter.create_presentation(attested, &excluded)?);
            }
        }

        Ok(presentations)
    }
}
