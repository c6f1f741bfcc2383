pub mod profile;
pub mod records;

pub use profile::{NewProfile, Profile, ProfileUpdate};
pub use records::{
    Assessment, Certificate, NewAssessment, NewCertificate, NewCvGenerationLog,
    NewPortfolioLink, NewProject, PortfolioLink, Project, ProjectUpdate,
};
