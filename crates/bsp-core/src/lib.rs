// bsp-core: provisioning workflow, export, and offline verification on top
// of the bsp-api service clients.
//
// Progress is persisted to a state file after every remote mutation (see
// `store`), which is what makes `Provisioner::run` safe to repeat.

pub mod csv_input;
pub mod error;
pub mod exporter;
pub mod model;
pub mod normalize;
pub mod provisioner;
pub mod store;
pub mod verifier;

pub use csv_input::{convert_csv_file, parse_csv};
pub use error::CoreError;
pub use exporter::{ExportSummary, GroupRoles, RoleExport, export_all, export_group_roles};
pub use model::{InputFile, KeyRecord, NormalizedSite, SiteInput, SiteState, StateFile};
pub use normalize::normalize_name;
pub use provisioner::{
    ProvisionReport, Provisioner, SITE_CONTROLLER_GROUP, Services, SiteReport,
};
pub use store::{KeyStore, StateStore};
pub use verifier::{SiteCheck, Verification, verify, verify_files};
