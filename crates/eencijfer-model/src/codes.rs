//! Categorical code tables used by the eencijfer register.
//!
//! Each table is a closed enum. Decoding goes through `from_code`, which
//! returns `None` for codes outside the table so the caller decides what an
//! unknown code becomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Registered sex of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Man,
    Vrouw,
    Onbekend,
}

impl Sex {
    /// Decodes the register code. Anything other than `M` or `V` is unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" => Sex::Man,
            "V" => Sex::Vrouw,
            _ => Sex::Onbekend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Man => "man",
            Sex::Vrouw => "vrouw",
            Sex::Onbekend => "onbekend",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Form of enrollment (full-time, part-time, dual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollmentForm {
    Voltijd,
    Deeltijd,
    Duaal,
}

impl EnrollmentForm {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(EnrollmentForm::Voltijd),
            2 => Some(EnrollmentForm::Deeltijd),
            3 => Some(EnrollmentForm::Duaal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentForm::Voltijd => "voltijd",
            EnrollmentForm::Deeltijd => "deeltijd",
            EnrollmentForm::Duaal => "duaal",
        }
    }
}

impl fmt::Display for EnrollmentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EnrollmentForm {
    type Err = String;

    /// Accepts both the numeric register code and the decoded label, so
    /// tables decoded with or without converters compare the same way.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "1" | "voltijd" => Ok(EnrollmentForm::Voltijd),
            "2" | "deeltijd" => Ok(EnrollmentForm::Deeltijd),
            "3" | "duaal" => Ok(EnrollmentForm::Duaal),
            _ => Err(format!("Unknown enrollment form: {s}")),
        }
    }
}

/// Phase of the program a diploma was awarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiplomaPhase {
    Propedeuse,
    AssociateDegree,
    Bachelor,
    Master,
    PostInitialMaster,
}

impl DiplomaPhase {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "D" => Some(DiplomaPhase::Propedeuse),
            "A" => Some(DiplomaPhase::AssociateDegree),
            "B" => Some(DiplomaPhase::Bachelor),
            "M" => Some(DiplomaPhase::Master),
            "Q" => Some(DiplomaPhase::PostInitialMaster),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiplomaPhase::Propedeuse => "propedeuse",
            DiplomaPhase::AssociateDegree => "associate degree",
            DiplomaPhase::Bachelor => "bachelor",
            DiplomaPhase::Master => "master",
            DiplomaPhase::PostInitialMaster => "post-initiele master",
        }
    }

    /// True for phases that end a program with a degree.
    pub fn is_degree(&self) -> bool {
        !matches!(self, DiplomaPhase::Propedeuse)
    }
}

impl fmt::Display for DiplomaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Program phase, covering both the pre-1993 and the bachelor/master regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramType {
    OudeStijl,
    Propedeuse,
    EersteFase,
    TweedeFase,
    Initieel,
    Vervolg,
    Kandidaatsfase,
    PropedeuseBachelor,
    Bachelor,
    Master,
    AssociateDegree,
    TussentijdsDoctoraal,
    PostInitieleMaster,
}

impl ProgramType {
    /// Label used when the phase code is missing or not in the table.
    pub const UNKNOWN: &'static str = "onbekend";

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "O" => Some(ProgramType::OudeStijl),
            "P" => Some(ProgramType::Propedeuse),
            "1" => Some(ProgramType::EersteFase),
            "2" => Some(ProgramType::TweedeFase),
            "I" => Some(ProgramType::Initieel),
            "V" => Some(ProgramType::Vervolg),
            "K" => Some(ProgramType::Kandidaatsfase),
            "D" => Some(ProgramType::PropedeuseBachelor),
            "B" => Some(ProgramType::Bachelor),
            "M" => Some(ProgramType::Master),
            "A" => Some(ProgramType::AssociateDegree),
            "T" => Some(ProgramType::TussentijdsDoctoraal),
            "Q" => Some(ProgramType::PostInitieleMaster),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::OudeStijl => "oude stijl (toegestaan t/m studiejaar 1992-1993)",
            ProgramType::Propedeuse => "propedeuse",
            ProgramType::EersteFase => {
                "1e fase (WO); hoofdfase (HBO) (toegestaan t/m studiejaar 92-93)"
            }
            ProgramType::TweedeFase => "2e fase (toegestaan t/m studiejaar 1996-1997)",
            ProgramType::Initieel => "initiële opleiding (toegestaan vanaf studiejaar 1993-1994)",
            ProgramType::Vervolg => "vervolgopleiding (toegestaan vanaf studiejaar 1993-1994)",
            ProgramType::Kandidaatsfase => "kandidaatsfase",
            ProgramType::PropedeuseBachelor => "propedeuse bachelor",
            ProgramType::Bachelor => "bachelor",
            ProgramType::Master => "master",
            ProgramType::AssociateDegree => "associate degree",
            ProgramType::TussentijdsDoctoraal => "tussentijds doctoraal",
            ProgramType::PostInitieleMaster => "post-initiële master",
        }
    }
}

/// Higher-education type within the kind of higher education (`ba`, `ma`, `ad`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HigherEducationType {
    Bachelor,
    Master,
    AssociateDegree,
}

impl HigherEducationType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "ba" => Some(HigherEducationType::Bachelor),
            "ma" => Some(HigherEducationType::Master),
            "ad" => Some(HigherEducationType::AssociateDegree),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HigherEducationType::Bachelor => "bachelor",
            HigherEducationType::Master => "master",
            HigherEducationType::AssociateDegree => "associate degree",
        }
    }
}

/// Croho sector of the current program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrohoSector {
    Sectoroverstijgend,
    Onderwijs,
    Landbouw,
    Natuur,
    Techniek,
    Gezondheidszorg,
    Economie,
    Recht,
    GedragEnMaatschappij,
    TaalEnCultuur,
}

impl CrohoSector {
    pub const UNKNOWN: &'static str = "onbekend";

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CrohoSector::Sectoroverstijgend),
            1 => Some(CrohoSector::Onderwijs),
            2 => Some(CrohoSector::Landbouw),
            3 => Some(CrohoSector::Natuur),
            4 => Some(CrohoSector::Techniek),
            5 => Some(CrohoSector::Gezondheidszorg),
            6 => Some(CrohoSector::Economie),
            7 => Some(CrohoSector::Recht),
            8 => Some(CrohoSector::GedragEnMaatschappij),
            9 => Some(CrohoSector::TaalEnCultuur),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CrohoSector::Sectoroverstijgend => "sectoroverstijgend",
            CrohoSector::Onderwijs => "onderwijs",
            CrohoSector::Landbouw => "landbouw en natuurlijke omgeving",
            CrohoSector::Natuur => "natuur",
            CrohoSector::Techniek => "techniek",
            CrohoSector::Gezondheidszorg => "gezondheidszorg",
            CrohoSector::Economie => "economie",
            CrohoSector::Recht => "recht",
            CrohoSector::GedragEnMaatschappij => "gedrag en maatschappij",
            CrohoSector::TaalEnCultuur => "taal en cultuur",
        }
    }
}

/// Outcome of the first year at the institution.
///
/// Variants are listed from lowest to highest precedence; `DiplomaBehaald`
/// is part of the published vocabulary but no derivation assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusAfterYear1 {
    StudeertNogAanHsl,
    SwitchBinnenInstelling,
    DiplomaBehaald,
    HoDiplomaInEersteJaar,
    ValtUitInJaar1,
}

impl StatusAfterYear1 {
    pub const ALL: [StatusAfterYear1; 5] = [
        StatusAfterYear1::StudeertNogAanHsl,
        StatusAfterYear1::SwitchBinnenInstelling,
        StatusAfterYear1::DiplomaBehaald,
        StatusAfterYear1::HoDiplomaInEersteJaar,
        StatusAfterYear1::ValtUitInJaar1,
    ];

    /// Applies the first-year flags in order; a later flag overwrites an
    /// earlier one, so dropout always wins.
    pub fn classify(switched: bool, degree_in_first_year: bool, dropout: bool) -> Self {
        let mut status = StatusAfterYear1::StudeertNogAanHsl;
        if switched {
            status = StatusAfterYear1::SwitchBinnenInstelling;
        }
        if degree_in_first_year {
            status = StatusAfterYear1::HoDiplomaInEersteJaar;
        }
        if dropout {
            status = StatusAfterYear1::ValtUitInJaar1;
        }
        status
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAfterYear1::StudeertNogAanHsl => "StudeertNogAanHsl",
            StatusAfterYear1::SwitchBinnenInstelling => "SwitchBinnenInstelling",
            StatusAfterYear1::DiplomaBehaald => "DiplomaBehaald",
            StatusAfterYear1::HoDiplomaInEersteJaar => "HoDiplomaInEersteJaar",
            StatusAfterYear1::ValtUitInJaar1 => "ValtUitInJaar1",
        }
    }
}

impl fmt::Display for StatusAfterYear1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusAfterYear1 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusAfterYear1::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown status: {s}"))
    }
}

/// Kind of final exam a grade belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExamKind {
    Central,
    School,
}

impl ExamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamKind::Central => "CSE",
            ExamKind::School => "School",
        }
    }
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a record belongs to the performance-agreement cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceAgreement {
    Ja,
    Nee,
}

impl PerformanceAgreement {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            PerformanceAgreement::Ja
        } else {
            PerformanceAgreement::Nee
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Ja" => Some(PerformanceAgreement::Ja),
            "Nee" => Some(PerformanceAgreement::Nee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceAgreement::Ja => "Ja",
            PerformanceAgreement::Nee => "Nee",
        }
    }

    /// Cohort type label derived from the flag.
    pub fn cohort_type(&self) -> &'static str {
        match self {
            PerformanceAgreement::Ja => "EersteKeerHO",
            PerformanceAgreement::Nee => "EersteKeerHsl",
        }
    }
}

/// The three prior-education fields of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorEducationRole {
    Hoogste,
    HoogsteVoorHetHo,
    HoogsteBinnenHetHo,
}

impl PriorEducationRole {
    /// Field name suffix used by the register for this role.
    pub fn field(&self) -> &'static str {
        match self {
            PriorEducationRole::Hoogste => "HoogsteVooropleiding",
            PriorEducationRole::HoogsteVoorHetHo => "HoogsteVooroplVoorHetHo",
            PriorEducationRole::HoogsteBinnenHetHo => "HoogsteVooroplBinnenHetHo",
        }
    }

    /// Column holding the institution code of the prior education.
    pub fn institution_column(&self) -> String {
        format!("InstellingVanDe{}", self.field())
    }

    /// Column holding the branch number of the prior education.
    pub fn branch_column(&self) -> String {
        format!("VestigingsnummerVanDe{}", self.field())
    }
}
