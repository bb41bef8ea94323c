mod normalize;
mod ocr;
mod requests;
mod types;

pub use normalize::{encode_extracted_data, extracted_data_from_text, extracted_data_from_value};
pub use ocr::{ocr_envelope, OCR_ENGINE, OCR_SCOPE, UPLOADED_IMAGE_URL};
pub use requests::{
    ApprovalResponse, ApproveSubmissionRequest, CreateSubmissionRequest, ListSubmissionsQuery,
};
pub use types::{InvoiceItem, NewInvoiceItem, Submission, SubmissionStatus, UnknownStatus};
