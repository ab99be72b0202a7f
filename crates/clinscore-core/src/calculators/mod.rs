//! The clinical calculators.
//!
//! One module per calculator. Each exposes a pure `compute_*` function and a
//! zero-sized type implementing [`ScoreCalculator`](crate::traits::ScoreCalculator).

pub mod aas;
pub mod air;
pub mod alvarado;
pub mod anthropometry;
pub mod apache;
pub mod asa;
pub mod charlson;
pub mod pas;
pub mod pathway;
pub mod ranson;
pub mod tg18;
pub mod tokyo;
pub mod wses;

pub use aas::{compute_aas, Aas, AasInput};
pub use air::{compute_air, Air, AirInput};
pub use alvarado::{compute_alvarado, Alvarado, AlvaradoInput};
pub use anthropometry::{
    compute_anthropometry, compute_bmi, compute_bsa, compute_ideal_weight, Anthropometry,
    AnthropometryInput, BmiCategory,
};
pub use apache::{compute_apache_ii, ApacheII, ApacheInput, ApacheResult};
pub use asa::{compute_asa, Asa, AsaClass, AsaInput, AsaResult};
pub use charlson::{compute_charlson, Charlson, CharlsonBand, CharlsonInput, CharlsonResult};
pub use pas::{compute_pas, Pas, PasInput};
pub use pathway::{
    compute_appendicitis_pathway, recommend_imaging, AppendicitisPathway, AppendicitisScores,
    ImagingRecommendation, PathwayInput, SpecialConditions,
};
pub use ranson::{compute_ranson, PancreatitisSeverity, Ranson, RansonInput};
pub use tg18::{
    classify_surgical_risk, compute_cholecystitis_management, compute_cholecystitis_risk,
    compute_tg18_severity, recommend_management, CholecystitisManagement,
    CholecystitisManagementInput, CholecystitisPlan, CholecystitisRisk, CholecystitisRiskInput,
    SurgicalRisk, Tg18Grade, Tg18Severity, Tg18SeverityInput,
};
pub use tokyo::{compute_tokyo, Tokyo, TokyoInput, TokyoResult};
pub use wses::{
    compute_management_review, review_management, AppendicitisManagement, ManagementPlan,
    ManagementReview,
};
