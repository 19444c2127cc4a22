//! Units of measure for hardware store products

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a product is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitMeasure {
    // Weight
    Kilogramo,
    Gramo,
    Libra,
    Tonelada,

    // Length
    Metro,
    Centimetro,
    Milimetro,
    Pulgada,
    Pie,

    // Area
    MetroCuadrado,
    CentimetroCuadrado,
    PieCuadrado,

    // Volume
    Litro,
    Mililitro,
    Galon,
    MetroCubico,

    // Count
    Pieza,
    Par,
    Docena,
    Unidad,

    // Hardware packaging
    Saco,
    Balde,
    Caja,
    Rollo,
    Hoja,
    Tubo,
    Barra,
    Tabla,

    // Special
    Paquete,
    Conjunto,
    Kit,
}

/// Grouping used when listing units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MeasureCategory {
    Weight,
    Length,
    Area,
    Volume,
    Count,
    Hardware,
    Special,
}

impl fmt::Display for MeasureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureCategory::Weight => write!(f, "weight"),
            MeasureCategory::Length => write!(f, "length"),
            MeasureCategory::Area => write!(f, "area"),
            MeasureCategory::Volume => write!(f, "volume"),
            MeasureCategory::Count => write!(f, "count"),
            MeasureCategory::Hardware => write!(f, "hardware"),
            MeasureCategory::Special => write!(f, "special"),
        }
    }
}

impl UnitMeasure {
    /// Every unit, in catalog order
    pub fn all() -> &'static [UnitMeasure] {
        use UnitMeasure::*;
        &[
            Kilogramo,
            Gramo,
            Libra,
            Tonelada,
            Metro,
            Centimetro,
            Milimetro,
            Pulgada,
            Pie,
            MetroCuadrado,
            CentimetroCuadrado,
            PieCuadrado,
            Litro,
            Mililitro,
            Galon,
            MetroCubico,
            Pieza,
            Par,
            Docena,
            Unidad,
            Saco,
            Balde,
            Caja,
            Rollo,
            Hoja,
            Tubo,
            Barra,
            Tabla,
            Paquete,
            Conjunto,
            Kit,
        ]
    }

    /// Wire code, e.g. `METRO_CUADRADO`
    pub fn code(&self) -> &'static str {
        use UnitMeasure::*;
        match self {
            Kilogramo => "KILOGRAMO",
            Gramo => "GRAMO",
            Libra => "LIBRA",
            Tonelada => "TONELADA",
            Metro => "METRO",
            Centimetro => "CENTIMETRO",
            Milimetro => "MILIMETRO",
            Pulgada => "PULGADA",
            Pie => "PIE",
            MetroCuadrado => "METRO_CUADRADO",
            CentimetroCuadrado => "CENTIMETRO_CUADRADO",
            PieCuadrado => "PIE_CUADRADO",
            Litro => "LITRO",
            Mililitro => "MILILITRO",
            Galon => "GALON",
            MetroCubico => "METRO_CUBICO",
            Pieza => "PIEZA",
            Par => "PAR",
            Docena => "DOCENA",
            Unidad => "UNIDAD",
            Saco => "SACO",
            Balde => "BALDE",
            Caja => "CAJA",
            Rollo => "ROLLO",
            Hoja => "HOJA",
            Tubo => "TUBO",
            Barra => "BARRA",
            Tabla => "TABLA",
            Paquete => "PAQUETE",
            Conjunto => "CONJUNTO",
            Kit => "KIT",
        }
    }

    /// Display name shown to store staff
    pub fn description(&self) -> &'static str {
        use UnitMeasure::*;
        match self {
            Kilogramo => "Kilogramo",
            Gramo => "Gramo",
            Libra => "Libra",
            Tonelada => "Tonelada",
            Metro => "Metro",
            Centimetro => "Centímetro",
            Milimetro => "Milímetro",
            Pulgada => "Pulgada",
            Pie => "Pie",
            MetroCuadrado => "Metro cuadrado",
            CentimetroCuadrado => "Centímetro cuadrado",
            PieCuadrado => "Pie cuadrado",
            Litro => "Litro",
            Mililitro => "Mililitro",
            Galon => "Galón",
            MetroCubico => "Metro cúbico",
            Pieza => "Pieza",
            Par => "Par",
            Docena => "Docena",
            Unidad => "Unidad",
            Saco => "Saco",
            Balde => "Balde",
            Caja => "Caja",
            Rollo => "Rollo",
            Hoja => "Hoja",
            Tubo => "Tubo",
            Barra => "Barra",
            Tabla => "Tabla",
            Paquete => "Paquete",
            Conjunto => "Conjunto",
            Kit => "Kit",
        }
    }

    pub fn category(&self) -> MeasureCategory {
        use UnitMeasure::*;
        match self {
            Kilogramo | Gramo | Libra | Tonelada => MeasureCategory::Weight,
            Metro | Centimetro | Milimetro | Pulgada | Pie => MeasureCategory::Length,
            MetroCuadrado | CentimetroCuadrado | PieCuadrado => MeasureCategory::Area,
            Litro | Mililitro | Galon | MetroCubico => MeasureCategory::Volume,
            Pieza | Par | Docena | Unidad => MeasureCategory::Count,
            Saco | Balde | Caja | Rollo | Hoja | Tubo | Barra | Tabla => {
                MeasureCategory::Hardware
            }
            Paquete | Conjunto | Kit => MeasureCategory::Special,
        }
    }
}

impl fmt::Display for UnitMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for UnitMeasure {
    type Err = String;

    /// Accepts wire codes case-insensitively, with `-` or space for `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        UnitMeasure::all()
            .iter()
            .find(|u| u.code() == normalized)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Invalid unit of measure: {}. Run `ferre measure list` to see valid units",
                    s
                )
            })
    }
}

/// The `measure` field of a product
///
/// Depending on the backend version this is either a unit code or a
/// reference object carrying a display name. Codes this client does not
/// know are kept as [`MeasureRef::Code`] rather than failing the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureRef {
    Unit(UnitMeasure),
    Named { name: String },
    Code(String),
}

impl MeasureRef {
    /// The unit, when it is (or names) a known unit
    pub fn unit(&self) -> Option<UnitMeasure> {
        match self {
            MeasureRef::Unit(unit) => Some(*unit),
            MeasureRef::Named { name } | MeasureRef::Code(name) => name.parse().ok(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MeasureRef::Unit(unit) => unit.description().to_string(),
            MeasureRef::Named { name } | MeasureRef::Code(name) => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_units_roundtrip_through_codes() {
        assert_eq!(UnitMeasure::all().len(), 31);
        for unit in UnitMeasure::all() {
            assert_eq!(unit.code().parse::<UnitMeasure>().unwrap(), *unit);
        }
    }

    #[test]
    fn test_wire_format_matches_code() {
        for unit in UnitMeasure::all() {
            let json = serde_json::to_string(unit).unwrap();
            assert_eq!(json, format!("\"{}\"", unit.code()));
        }
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!("pieza".parse::<UnitMeasure>(), Ok(UnitMeasure::Pieza));
        assert_eq!(
            "metro-cuadrado".parse::<UnitMeasure>(),
            Ok(UnitMeasure::MetroCuadrado)
        );
        assert_eq!(
            " Metro cubico ".parse::<UnitMeasure>(),
            Ok(UnitMeasure::MetroCubico)
        );
        assert!("furlong".parse::<UnitMeasure>().is_err());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(UnitMeasure::Centimetro.description(), "Centímetro");
        assert_eq!(UnitMeasure::Galon.description(), "Galón");
        assert_eq!(UnitMeasure::MetroCubico.description(), "Metro cúbico");
    }

    #[test]
    fn test_categories() {
        let count = |cat| {
            UnitMeasure::all()
                .iter()
                .filter(|u| u.category() == cat)
                .count()
        };
        assert_eq!(count(MeasureCategory::Weight), 4);
        assert_eq!(count(MeasureCategory::Length), 5);
        assert_eq!(count(MeasureCategory::Area), 3);
        assert_eq!(count(MeasureCategory::Volume), 4);
        assert_eq!(count(MeasureCategory::Count), 4);
        assert_eq!(count(MeasureCategory::Hardware), 8);
        assert_eq!(count(MeasureCategory::Special), 3);
    }

    #[test]
    fn test_measure_ref_variants() {
        let unit: MeasureRef = serde_json::from_str("\"CAJA\"").unwrap();
        assert_eq!(unit, MeasureRef::Unit(UnitMeasure::Caja));
        assert_eq!(unit.label(), "Caja");

        let named: MeasureRef = serde_json::from_str(r#"{"name":"Bolsa"}"#).unwrap();
        assert_eq!(named.label(), "Bolsa");
        assert_eq!(named.unit(), None);

        let named_unit: MeasureRef = serde_json::from_str(r#"{"name":"LITRO"}"#).unwrap();
        assert_eq!(named_unit.unit(), Some(UnitMeasure::Litro));
    }

    #[test]
    fn test_unknown_code_is_kept() {
        let unit: MeasureRef = serde_json::from_str("\"ROLLO\"").unwrap();
        assert_eq!(unit, MeasureRef::Code("ROLLO".to_string()));
        assert_eq!(unit.unit(), None);
        assert_eq!(unit.label(), "ROLLO");
        assert_eq!(serde_json::to_string(&unit).unwrap(), "\"ROLLO\"");
    }
}
