//! Three-step assistance application wizard: location cascade, phone
//! normalization, draft persistence, optional text assist, and submission.

pub mod assist;
pub mod clock;
pub mod domain;
pub mod draft;
pub mod locations;
pub mod phone;
pub mod router;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use assist::{
    AssistError, AssistRequester, AssistSuggestion, ChatCompletionsClient, Credential,
    GenerationError, GenerationRequest, TextGenerator,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    ApplicationDraft, CityChoice, EmploymentStatus, FamilyFinancial, Gender, HousingStatus,
    LocationId, MaritalStatus, NarrativeField, PersonalDetails, Selection, Situation, Step1Form,
    Step2Form, Step3Form, StepAnswers,
};
pub use draft::{
    DraftStore, FileDraftStore, FormState, MemoryDraftStore, PersistenceError, DRAFT_STORAGE_KEY,
};
pub use locations::{CityOption, LoadError, LocationCatalog, LocationOption, NO_CITIES_LABEL};
pub use phone::{DialCodeEntry, PhoneError, PhoneNormalizer, DIAL_CODES};
pub use router::{wizard_router, SharedWizard};
pub use submission::{
    MockSubmissionGateway, SubmissionError, SubmissionGateway, SubmissionReceipt,
};
pub use validation::{FieldError, ValidationErrors, MINIMUM_AGE_YEARS};
pub use wizard::{WizardController, WizardError, WizardStatus, WizardStep};

#[cfg(test)]
mod tests;
