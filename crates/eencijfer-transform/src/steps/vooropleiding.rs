//! Prior education (vooropleiding) and the institution that provided it.

use std::sync::LazyLock;

use polars::prelude::DataFrame;
use regex::Regex;

use eencijfer_common::{
    LeftJoin, ensure_unique, has_column, parse_i64, string_column, string_values,
};
use eencijfer_model::PriorEducationRole;
use eencijfer_model::columns::{
    BRINNUMMER, OMSCHRIJVING_VOOROPLEIDING, VESTIGINGSNUMMER, VOOROPLEIDING_CODE,
};

use crate::error::{Result, TransformError};
use crate::pipeline::EnrichmentStep;
use crate::reference::{DEC_BRINVESTIGINGSNUMMER, DEC_VOPL, ReferenceTables};

/// Short codes, tried in order; the first marker found in a description wins.
pub const VOOROPLEIDING_MARKERS: [&str; 10] = [
    "mbo",
    "vwo",
    "havo",
    "hbo-p",
    "hbo-ba",
    "hbo-ad",
    "hbo-master",
    "wo-p",
    "wo-ba",
    "wo-master",
];

/// Short code for descriptions without a known marker.
pub const VOOROPLEIDING_OVERIG: &str = "overig";

/// University master tracks (pre-master, teacher training) that `wo-p` would
/// otherwise claim. Tried in the `wo-p` slot of the marker order.
const WO_MASTER_TRACKS: &str = r"wo-(?:pim|on/ma)";

static MARKER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    VOOROPLEIDING_MARKERS
        .iter()
        .flat_map(|marker| {
            let track = (*marker == "wo-p").then(|| ("wo-master", WO_MASTER_TRACKS.to_string()));
            track.into_iter().chain([(*marker, regex::escape(marker))])
        })
        .map(|(code, pattern)| {
            let pattern = format!(r"(?i)\b{pattern}");
            (code, Regex::new(&pattern).expect("Invalid marker regex"))
        })
        .collect()
});

/// Short code (`havo`, `mbo`, `wo-ba`, ...) of a prior-education description.
///
/// Markers must start at a word boundary and are matched case-insensitively.
/// `wo-pim` and `wo-on/ma` descriptions are `wo-master`.
pub fn vooropleiding_kort(description: &str) -> &'static str {
    MARKER_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(description))
        .map_or(VOOROPLEIDING_OVERIG, |(marker, _)| *marker)
}

const PROFILES: [&str; 11] = [
    "ALG", "CM", "EM", "EM & CM", "NG", "NG & CM", "NG & EM", "NT", "NT & CM", "NT & EM",
    "NT & NG",
];

/// Exam profile of havo (200-211) and vwo (400-411) prior-education codes.
pub fn profile_for_code(code: i64) -> Option<&'static str> {
    match code {
        200 => Some("ONB"),
        400 => Some("ONG"),
        201..=211 | 401..=411 => usize::try_from(code % 200 - 1)
            .ok()
            .and_then(|idx| PROFILES.get(idx).copied()),
        _ => None,
    }
}

/// Decodes the prior-education code of one role against `Dec_vopl`.
///
/// Adds `<field>Code`, `<field>Volledig`, `<field>Profiel` and `<field>Kort`.
pub struct VooropleidingStep {
    role: PriorEducationRole,
}

impl VooropleidingStep {
    pub fn new(role: PriorEducationRole) -> Self {
        Self { role }
    }

    fn output_names(&self) -> [String; 4] {
        let field = self.role.field();
        [
            format!("{field}Code"),
            format!("{field}Volledig"),
            format!("{field}Profiel"),
            format!("{field}Kort"),
        ]
    }
}

impl EnrichmentStep for VooropleidingStep {
    fn step_name(&self) -> &str {
        "vooropleiding"
    }

    fn declared_columns(&self, _input: &DataFrame, _refs: &ReferenceTables) -> Vec<String> {
        self.output_names().to_vec()
    }

    fn should_skip(&self, refs: &ReferenceTables) -> bool {
        refs.vooropleidingen.is_none()
    }

    fn execute(&self, df: &DataFrame, refs: &ReferenceTables) -> Result<DataFrame> {
        let reference =
            refs.vooropleidingen
                .as_ref()
                .ok_or_else(|| TransformError::MissingReference {
                    table: DEC_VOPL.to_string(),
                })?;
        ensure_unique(reference, &[VOOROPLEIDING_CODE], DEC_VOPL)?;

        let codes = string_values(reference, VOOROPLEIDING_CODE)?;
        let descriptions = string_values(reference, OMSCHRIJVING_VOOROPLEIDING)?;
        let profiles = codes
            .iter()
            .map(|code| {
                code.as_deref()
                    .and_then(parse_i64)
                    .and_then(profile_for_code)
                    .map(str::to_string)
            })
            .collect();
        let shorts = descriptions
            .iter()
            .map(|d| d.as_deref().map(|d| vooropleiding_kort(d).to_string()))
            .collect();

        let [code, volledig, profiel, kort] = self.output_names();
        let lookup = DataFrame::new(vec![
            string_column(&code, codes),
            string_column(&volledig, descriptions),
            string_column(&profiel, profiles),
            string_column(&kort, shorts),
        ])?;

        let joined = LeftJoin::new(self.step_name(), &[self.role.field()], &[code.as_str()])
            .execute(df, &lookup)?;
        Ok(joined)
    }
}

/// Joins the institution directory onto the institution and branch of one
/// prior-education role.
pub struct InstellingVooropleidingStep {
    role: PriorEducationRole,
}

impl InstellingVooropleidingStep {
    pub fn new(role: PriorEducationRole) -> Self {
        Self { role }
    }

    fn renames(&self) -> Vec<(&'static str, String)> {
        let field = self.role.field();
        vec![
            (BRINNUMMER, self.role.institution_column()),
            (VESTIGINGSNUMMER, self.role.branch_column()),
            ("NaamInstellingVooropleiding", format!("NaamInstelling{field}")),
            ("PostcodeInstellingVooropleiding", format!("PostcodeInstelling{field}")),
            ("PlaatsInstellingVooropleiding", format!("PlaatsInstelling{field}")),
            (
                "DatumOprichtingInstellingVooropleiding",
                format!("DatumOprichtingInstelling{field}"),
            ),
            (
                "DatumOpheffingInstellingVooropleiding",
                format!("DatumOpheffingInstelling{field}"),
            ),
            (
                "DenominatieInstellingVooropleidingCode",
                format!("CodeDenominatieInstelling{field}"),
            ),
            (
                "NaamDenominatieInstellingVooropleiding",
                format!("DenominatieInstelling{field}"),
            ),
        ]
    }

    fn renamed_reference(&self, reference: &DataFrame) -> Result<DataFrame> {
        let mut renamed = reference.clone();
        for (source, target) in self.renames() {
            if has_column(&renamed, source) {
                renamed.rename(source, target.as_str().into())?;
            }
        }
        Ok(renamed)
    }

    fn join_keys(&self) -> [String; 2] {
        [self.role.institution_column(), self.role.branch_column()]
    }
}

impl EnrichmentStep for InstellingVooropleidingStep {
    fn step_name(&self) -> &str {
        "instelling_vooropleiding"
    }

    fn declared_columns(&self, input: &DataFrame, refs: &ReferenceTables) -> Vec<String> {
        let Some(reference) = refs.instellingen.as_ref() else {
            return Vec::new();
        };
        let Ok(renamed) = self.renamed_reference(reference) else {
            return Vec::new();
        };
        let [brin, vestiging] = self.join_keys();
        let keys = [brin.as_str(), vestiging.as_str()];
        LeftJoin::on(self.step_name(), &keys)
            .suffix("_Vooropleiding")
            .attached_names(input, &renamed)
            .into_iter()
            .map(|(_, target)| target)
            .collect()
    }

    fn should_skip(&self, refs: &ReferenceTables) -> bool {
        refs.instellingen.is_none()
    }

    fn execute(&self, df: &DataFrame, refs: &ReferenceTables) -> Result<DataFrame> {
        let reference =
            refs.instellingen
                .as_ref()
                .ok_or_else(|| TransformError::MissingReference {
                    table: DEC_BRINVESTIGINGSNUMMER.to_string(),
                })?;
        let renamed = self.renamed_reference(reference)?;
        let [brin, vestiging] = self.join_keys();
        let keys = [brin.as_str(), vestiging.as_str()];
        ensure_unique(&renamed, &keys, DEC_BRINVESTIGINGSNUMMER)?;

        let joined = LeftJoin::on(self.step_name(), &keys)
            .suffix("_Vooropleiding")
            .execute(df, &renamed)?;
        Ok(joined)
    }
}
