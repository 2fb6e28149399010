//! Catalogue of searchable categories and their OneMap theme codes.

/// A searchable facility category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    Preschools,
    Kindergartens,
    PrivateEducation,
    CetCentres,
    Libraries,
    TouristSpot,
    Hotels,
    Parks,
    HawkerCentres,
    Childcare,
    Supermarkets,
    MoneyChanger,
    Gyms,
    ResidentsCommittee,
    CommunityClubs,
    Hospitals,
    Pharmacy,
    ChasClinics,
    Aeds,
    PoliceStation,
    FireStation,
    Museums,
    Monuments,
    HistoricSites,
}

impl Theme {
    pub const ALL: [Theme; 24] = [
        Theme::Preschools,
        Theme::Kindergartens,
        Theme::PrivateEducation,
        Theme::CetCentres,
        Theme::Libraries,
        Theme::TouristSpot,
        Theme::Hotels,
        Theme::Parks,
        Theme::HawkerCentres,
        Theme::Childcare,
        Theme::Supermarkets,
        Theme::MoneyChanger,
        Theme::Gyms,
        Theme::ResidentsCommittee,
        Theme::CommunityClubs,
        Theme::Hospitals,
        Theme::Pharmacy,
        Theme::ChasClinics,
        Theme::Aeds,
        Theme::PoliceStation,
        Theme::FireStation,
        Theme::Museums,
        Theme::Monuments,
        Theme::HistoricSites,
    ];

    /// Look up a category by its user-facing label (exact match).
    pub fn resolve(label: &str) -> Option<Theme> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Preschools => "Preschools",
            Theme::Kindergartens => "Kindergartens",
            Theme::PrivateEducation => "Private Education",
            Theme::CetCentres => "CET Centres",
            Theme::Libraries => "Libraries",
            Theme::TouristSpot => "Tourist Spot",
            Theme::Hotels => "Hotels",
            Theme::Parks => "Parks",
            Theme::HawkerCentres => "Hawker Centres",
            Theme::Childcare => "Childcare",
            Theme::Supermarkets => "Supermarkets",
            Theme::MoneyChanger => "Money Changer",
            Theme::Gyms => "Gyms",
            Theme::ResidentsCommittee => "RC",
            Theme::CommunityClubs => "CC",
            Theme::Hospitals => "Hospitals",
            Theme::Pharmacy => "Pharmacy",
            Theme::ChasClinics => "CHAS Clinics",
            Theme::Aeds => "AEDs",
            Theme::PoliceStation => "Police Station",
            Theme::FireStation => "Fire Station",
            Theme::Museums => "Museums",
            Theme::Monuments => "Monuments",
            Theme::HistoricSites => "Historic Sites",
        }
    }

    /// OneMap `queryName`.
    pub fn code(self) -> &'static str {
        match self {
            Theme::Preschools => "preschools_location",
            Theme::Kindergartens => "kindergartens",
            Theme::PrivateEducation => "cpe_pei_premises",
            Theme::CetCentres => "cetcentres",
            Theme::Libraries => "libraries",
            Theme::TouristSpot => "tourism",
            Theme::Hotels => "hotels",
            Theme::Parks => "nationalparks",
            Theme::HawkerCentres => "hawkercentre",
            Theme::Childcare => "childcare",
            Theme::Supermarkets => "supermarkets",
            Theme::MoneyChanger => "moneychanger",
            Theme::Gyms => "exercisefacilities",
            Theme::ResidentsCommittee => "residentscommittee",
            Theme::CommunityClubs => "communityclubs",
            Theme::Hospitals => "moh_hospitals",
            Theme::Pharmacy => "registered_pharmacy",
            Theme::ChasClinics => "moh_chas_clinics",
            Theme::Aeds => "aed_locations",
            Theme::PoliceStation => "spf_establishments",
            Theme::FireStation => "firestation",
            Theme::Museums => "museum",
            Theme::Monuments => "monuments",
            Theme::HistoricSites => "historicsites",
        }
    }

    /// Whether the upstream `DESCRIPTION` field is worth showing.
    ///
    /// Most themes carry boilerplate or internal ids there.
    pub fn has_useful_description(self) -> bool {
        matches!(
            self,
            Theme::TouristSpot
                | Theme::Parks
                | Theme::Gyms
                | Theme::ChasClinics
                | Theme::Museums
                | Theme::Monuments
                | Theme::HistoricSites
                | Theme::FireStation
        )
    }
}

/// Top-level menu group of categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeGroup {
    Education,
    Recreation,
    Community,
    Health,
    Cultural,
    Emergency,
}

impl ThemeGroup {
    /// Main-menu order, two per row.
    pub const ALL: [ThemeGroup; 6] = [
        ThemeGroup::Education,
        ThemeGroup::Recreation,
        ThemeGroup::Community,
        ThemeGroup::Health,
        ThemeGroup::Cultural,
        ThemeGroup::Emergency,
    ];

    pub fn resolve(label: &str) -> Option<ThemeGroup> {
        Self::ALL.into_iter().find(|g| g.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeGroup::Education => "Education",
            ThemeGroup::Recreation => "Recreation",
            ThemeGroup::Community => "Community",
            ThemeGroup::Health => "Health",
            ThemeGroup::Cultural => "Cultural",
            ThemeGroup::Emergency => "Emergency",
        }
    }

    /// Themes of this group, laid out as keyboard rows.
    pub fn rows(self) -> &'static [&'static [Theme]] {
        match self {
            ThemeGroup::Education => &[
                &[Theme::Preschools, Theme::Kindergartens],
                &[Theme::PrivateEducation, Theme::Libraries],
                &[Theme::CetCentres],
            ],
            ThemeGroup::Recreation => &[&[Theme::TouristSpot, Theme::Hotels], &[Theme::Parks]],
            ThemeGroup::Community => &[
                &[Theme::HawkerCentres, Theme::Childcare],
                &[Theme::Supermarkets, Theme::MoneyChanger],
                &[Theme::Gyms, Theme::ResidentsCommittee, Theme::CommunityClubs],
            ],
            ThemeGroup::Health => &[&[Theme::Pharmacy, Theme::ChasClinics], &[Theme::Hospitals]],
            ThemeGroup::Cultural => &[&[Theme::Museums, Theme::Monuments], &[Theme::HistoricSites]],
            ThemeGroup::Emergency => &[&[Theme::PoliceStation, Theme::FireStation], &[Theme::Aeds]],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn resolves_known_labels() {
        assert_eq!(Theme::resolve("Parks"), Some(Theme::Parks));
        assert_eq!(Theme::Parks.code(), "nationalparks");
        assert_eq!(Theme::resolve("CHAS Clinics").map(|t| t.code()), Some("moh_chas_clinics"));
        assert_eq!(Theme::resolve("Zoos"), None);
        assert_eq!(Theme::resolve("parks"), None);
    }

    #[test]
    fn labels_and_codes_are_unique() {
        let labels: HashSet<_> = Theme::ALL.iter().map(|t| t.label()).collect();
        let codes: HashSet<_> = Theme::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(labels.len(), Theme::ALL.len());
        assert_eq!(codes.len(), Theme::ALL.len());
    }

    #[test]
    fn useful_descriptions_are_limited() {
        let useful: Vec<_> = Theme::ALL
            .iter()
            .filter(|t| t.has_useful_description())
            .map(|t| t.label())
            .collect();
        assert_eq!(useful.len(), 8);
        assert!(useful.contains(&"CHAS Clinics"));
        assert!(!Theme::Hotels.has_useful_description());
    }

    #[test]
    fn every_theme_belongs_to_exactly_one_group() {
        let mut seen = HashSet::new();
        for group in ThemeGroup::ALL {
            for row in group.rows() {
                for theme in row.iter() {
                    assert!(seen.insert(*theme), "{theme:?} listed twice");
                }
            }
        }
        assert_eq!(seen.len(), Theme::ALL.len());
        assert_eq!(ThemeGroup::resolve("Health"), Some(ThemeGroup::Health));
        assert_eq!(ThemeGroup::resolve("Parks"), None);
    }
}
