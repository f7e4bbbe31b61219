mod service;

pub use service::PermissionReportService;
