//! Default zone assignment from an applicant's role.

use accreditation_db::entities::zone;

/// Zone name for the press box.
pub const PRESS_ZONE: &str = "Prensa";

/// Zone name for the pitch.
pub const FIELD_ZONE: &str = "Cancha";

/// Roles that work from the pitch.
const FIELD_KEYWORDS: &[&str] = &[
    "fotógrafo de cancha",
    "fotografo de cancha",
    "fotógrafo cancha",
    "fotografo cancha",
    "reportero gráfico",
    "reportero grafico",
    "comunicaciones visita",
    "prensa visita",
];

/// Roles that work from the press box.
const PRESS_KEYWORDS: &[&str] = &[
    "periodista",
    "reportero",
    "pupitre",
    "locutor",
    "relator",
    "comentarista",
    "camarógrafo",
    "camarografo",
    "técnico",
    "tecnico",
];

/// Pick the default zone for a role, or `None` when no rule applies.
///
/// Field roles are checked first since some of them contain press keywords.
#[must_use]
pub fn resolve_zone_for_role(role: &str, zones: &[zone::Model]) -> Option<i32> {
    let role = role.to_lowercase();
    if role.trim().is_empty() {
        return None;
    }

    let target = if FIELD_KEYWORDS.iter().any(|k| role.contains(k)) {
        FIELD_ZONE
    } else if PRESS_KEYWORDS.iter().any(|k| role.contains(k)) {
        PRESS_ZONE
    } else {
        return None;
    };

    zones
        .iter()
        .find(|z| z.name.trim().to_lowercase() == target.to_lowercase())
        .map(|z| z.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> Vec<zone::Model> {
        vec![
            zone::Model {
                id: 1,
                event_id: 1,
                name: "PRENSA".to_string(),
            },
            zone::Model {
                id: 2,
                event_id: 1,
                name: "Cancha".to_string(),
            },
            zone::Model {
                id: 3,
                event_id: 1,
                name: "Tribuna".to_string(),
            },
        ]
    }

    #[test]
    fn test_press_roles() {
        let zones = zones();
        assert_eq!(resolve_zone_for_role("Periodista", &zones), Some(1));
        assert_eq!(resolve_zone_for_role("Relator radial", &zones), Some(1));
        assert_eq!(resolve_zone_for_role("CAMARÓGRAFO", &zones), Some(1));
    }

    #[test]
    fn test_field_roles_win_over_press_keywords() {
        let zones = zones();
        assert_eq!(resolve_zone_for_role("Fotógrafo de cancha", &zones), Some(2));
        assert_eq!(resolve_zone_for_role("Reportero gráfico", &zones), Some(2));
        assert_eq!(resolve_zone_for_role("Comunicaciones visita", &zones), Some(2));
    }

    #[test]
    fn test_unmapped_role_is_unassigned() {
        let zones = zones();
        assert_eq!(resolve_zone_for_role("Jefe de seguridad", &zones), None);
        assert_eq!(resolve_zone_for_role("", &zones), None);
    }

    #[test]
    fn test_missing_zone_is_unassigned() {
        let zones = vec![zone::Model {
            id: 9,
            event_id: 1,
            name: "Tribuna".to_string(),
        }];
        assert_eq!(resolve_zone_for_role("Periodista", &zones), None);
    }
}
