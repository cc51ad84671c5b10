//! Column names of the register extracts, reference tables and assets.

// Student registration file.
pub const PERSOONSGEBONDEN_NUMMER: &str = "PersoonsgebondenNummer";
pub const INSCHRIJVINGSJAAR: &str = "Inschrijvingsjaar";
pub const EERSTE_JAAR_INSTELLING: &str = "EersteJaarAanDezeActueleInstelling";
pub const EERSTE_JAAR_HO: &str = "EersteJaarInHetHogerOnderwijs";
pub const ACTUELE_INSTELLING: &str = "ActueleInstelling";
pub const OPLEIDINGSCODE: &str = "Opleidingscode";
pub const OPLEIDING_ACTUEEL: &str = "OpleidingActueelEquivalent";
pub const OPLEIDING_HISTORISCH: &str = "OpleidingHistorischEquivalent";
pub const OPLEIDINGSVORM: &str = "Opleidingsvorm";
pub const OPLEIDINGSFASE: &str = "Opleidingsfase";
pub const DIPLOMA_FASE: &str = "OpleidingsfaseActueelVanHetDiploma";
pub const DIPLOMAJAAR: &str = "Diplomajaar";
pub const DATUM_TEKENING_DIPLOMA: &str = "DatumTekeningDiploma";
pub const INDICATIE_ACTIEF: &str = "IndicatieActiefOpPeildatum";
pub const SOORT_INSCHRIJVING_HO: &str = "SoortInschrijvingHogerOnderwijs";
pub const TYPE_HO: &str = "TypeHogerOnderwijsBinnenSoortHogerOnderwijs";
pub const CROHO_ONDERDEEL_ACTUEEL: &str = "CrohoOnderdeelActueleOpleiding";
pub const HOOGSTE_VOOROPLEIDING: &str = "HoogsteVooropleiding";
pub const HOOGSTE_VOOROPLEIDING_VOOR_HO: &str = "HoogsteVooropleidingVoorHetHo";
pub const ONDERWIJSNUMMER: &str = "Onderwijsnummer";
pub const BURGERSERVICENUMMER: &str = "Burgerservicenummer";

/// Columns emptied during pseudonymization.
pub const PII_COLUMNS: [&str; 2] = [ONDERWIJSNUMMER, BURGERSERVICENUMMER];

// Enriched student table.
pub const AANTAL: &str = "Aantal";
pub const NAAM_OPLEIDING_CROHO: &str = "NaamOpleidingCroho";
pub const OPLEIDING: &str = "opleiding";
pub const CROHO_ONDERDEEL: &str = "CrohoOnderdeel";
pub const SOORT_DIPLOMA: &str = "SoortDiploma";
pub const HO_DIPLOMA_EERSTE_JAAR: &str = "HoDiplomaInEersteJaar";
pub const TYPE_OPLEIDING: &str = "TypeOpleiding";
pub const IN_PA_COHORT: &str = "InPACohortDefinitie";
pub const ISCED_RUBRIEK: &str = "ISCEDF2013Rubriek";
pub const CODE_OPLEIDING: &str = "CodeOpleiding";

// Reference tables.
pub const VOOROPLEIDING_CODE: &str = "VooropleidingCode";
pub const OMSCHRIJVING_VOOROPLEIDING: &str = "OmschrijvingVooropleiding";
pub const PROFIEL_VOOROPLEIDING: &str = "ProfielVooropleiding";
pub const VOOROPLEIDING_KORT: &str = "VooropleidingKort";
pub const NAAM_OPLEIDING: &str = "NaamOpleiding";
pub const BRINNUMMER: &str = "Brinnummer";
pub const VESTIGINGSNUMMER: &str = "Vestigingsnummer";
pub const VOOROPLEIDING_OORSPRONKELIJK: &str = "VooropleidingOorspronkelijkeCode";
pub const OMSCHRIJVING_VOOROPLEIDING_OORSPRONKELIJK: &str =
    "OmschrijvingVooropleidingOorspronkelijkeCode";

// Cohort table.
pub const COHORT: &str = "Cohort";
pub const COHORT_TYPE: &str = "CohortType";
pub const UITVAL_EERSTE_JAAR: &str = "UitvalEerstejaar";
pub const OPLEIDING_GELIJK: &str = "opleiding_gelijk";
pub const HERINSCHRIJVING_INSTELLING: &str = "HerinschrijvingInstelling";
pub const SWITCH_BINNEN_INSTELLING: &str = "SwitchBinnenInstelling";
pub const JAAR_PROPEDEUSE_DIPLOMA: &str = "JaarPropedeuseDiploma";
pub const PROPEDEUSE_IN_1_JAAR: &str = "PropedeuseIn1Jaar";
pub const PROPEDEUSE_IN_2_JAAR: &str = "PropedeuseIn2Jaar";
pub const UITVAL_MET_PROPEDEUSE: &str = "Uitval1JaarMetPropedeuse";
pub const HERINSCHRIJVING_MET_PROPEDEUSE: &str = "HerinschrijvingMetPropedeuse";
pub const BACHELOR_DIPLOMA: &str = "BachelorDiploma";
pub const JAAR_TOT_EEN_DIPLOMA: &str = "JaarTotEenDiploma";
pub const DIT_BACHELOR_DIPLOMA: &str = "DitBachelorDiploma";
pub const JAAR_TOT_DIT_DIPLOMA: &str = "JaarTotDitDiploma";
pub const STATUS_NA_1_JAAR: &str = "StatusNa1Jaar";

/// Suffix of second-year columns joined onto the entry cohort.
pub const SUFFIX_TWEEDE_JAAR: &str = "_2ejaar";
/// Suffix of the earliest bachelor diploma of any program.
pub const SUFFIX_EEN_DIPLOMA: &str = "_EenDiploma";
/// Suffix of the earliest bachelor diploma of the entry program.
pub const SUFFIX_DIT_DIPLOMA: &str = "_DitDiploma";

/// Years after entry for which degree-within-N-years indicators are derived.
pub const DEGREE_WINDOWS: [i64; 5] = [4, 5, 6, 7, 8];

pub fn een_diploma_binnen(years: i64) -> String {
    format!("EenDiplomaBinnen{years}jaar")
}

pub fn dit_diploma_binnen(years: i64) -> String {
    format!("DitDiplomaBinnen{years}jaar")
}

// Exam-grade table.
pub const VAK_CODE: &str = "VakCode";
pub const VAK_AFKORTING: &str = "VakAfkorting";
pub const VOOROPLEIDING: &str = "Vooropleiding";
pub const CIJFER_EERSTE_CE: &str = "CijferEersteCentraalExamen";
pub const CIJFER_TWEEDE_CE: &str = "CijferTweedeCentraalExamen";
pub const CIJFER_DERDE_CE: &str = "CijferDerdeCentraalExamen";
pub const CIJFER_SCHOOLEXAMEN: &str = "CijferSchoolexamen";
pub const POGING: &str = "Poging";
pub const SOORT_EXAMEN: &str = "SoortExamen";
pub const CIJFER: &str = "Cijfer";

/// Wide score columns of the exam file, in reshaping order.
pub const SCORE_COLUMNS: [&str; 4] = [
    CIJFER_EERSTE_CE,
    CIJFER_TWEEDE_CE,
    CIJFER_DERDE_CE,
    CIJFER_SCHOOLEXAMEN,
];
