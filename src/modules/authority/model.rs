pub use campusdesk_models::domains::{
    AuthorityDomain, CreateDomainDto, DomainDetail, DomainMember, UpdateDomainDto,
};
pub use campusdesk_models::problems::{
    AuthorityStats, Problem, ProblemStatus, ProblemWithComments, TransferProblemDto,
    UpdateProblemStatusDto,
};
