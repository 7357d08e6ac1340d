//! Prompt templates.

pub const SYSTEM_MESSAGE: &str = "You are a meticulous archivist. You transcribe scanned \
documents faithfully and classify them so they can be filed under a consistent, \
descriptive file name. You never invent content that is not visible in the document.";

/// Sent before the page image. `{page_number}` is substituted.
pub const PAGE_TRANSCRIPTION_INTRO: &str = "The image below is page {page_number} of a \
scanned document.";

/// Sent after the page image. `{page_number}` is substituted.
pub const PAGE_TRANSCRIPTION_INSTRUCTIONS: &str = "Transcribe page {page_number} as XML. \
Wrap the whole page in <page number=\"{page_number}\"> ... </page>. Use <heading>, \
<paragraph>, <table>/<row>/<cell>, <list>/<item>, <signature> and <stamp> elements to \
preserve the layout. Keep the original language and spelling, escape XML special \
characters, and output nothing except the XML.";

/// Wraps text already extracted from the page, when available.
pub const PAGE_TEXT_HINT: &str = "Text extracted from this page by OCR (may contain \
errors):\n<ocr_text>\n{text}\n</ocr_text>";

/// File-name generation prompt. `{TRANSCRIPT}` and `{SCHEMA}` are substituted.
pub const FILE_NAME_GENERATION_PROMPT: &str = "Below is the XML transcript of a document.\n\n\
<transcript>\n{TRANSCRIPT}\n</transcript>\n\n\
Analyse the document and produce a file name for it.\n\
For every field, first write your analysis, then the derived value:\n\
- document_summary: how you condensed the content (formatting_process) and a one \
sentence summary;\n\
- document_type: the kind of document (invoice, contract, bank statement, ...);\n\
- important_date: the date that best identifies the document, formatted YYYY-MM-DD;\n\
- language: ISO 639-1 code of the document language;\n\
- main_entities: the people or organizations the document is about;\n\
- type_abbreviation: a short upper-case abbreviation of the document type.\n\n\
The file name is `<type_abbr> <date> <entities> - <summary>`, at most 120 characters, \
without characters that are invalid in file names (/ \\ : * ? \" < > |).\n\n\
Answer with a single JSON object that validates against this JSON schema and nothing \
else:\n{SCHEMA}";

pub fn page_intro(page_number: &str) -> String {
    PAGE_TRANSCRIPTION_INTRO.replace("{page_number}", page_number)
}

pub fn page_instructions(page_number: &str) -> String {
    PAGE_TRANSCRIPTION_INSTRUCTIONS.replace("{page_number}", page_number)
}

pub fn page_text_hint(text: &str) -> String {
    PAGE_TEXT_HINT.replace("{text}", text)
}

/// Opening tag the assistant reply is prefilled with.
pub fn page_prefill(page_number: &str) -> String {
    format!("<page number=\"{}\">", page_number)
}

pub fn file_name_prompt(transcript: &str, schema: &str) -> String {
    FILE_NAME_GENERATION_PROMPT
        .replace("{SCHEMA}", schema)
        .replace("{TRANSCRIPT}", transcript)
}
