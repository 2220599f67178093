//! Prompt engineering for invoice field extraction

/// Builds the per-document extraction prompt
///
/// Two flavors: an inline prompt carrying the full document text, and a
/// handle prompt naming a remote file id for the model to resolve through
/// its offered tools.
pub struct PromptBuilder {
    flavor: Flavor,
}

enum Flavor {
    Inline(String),
    Handle(String),
}

impl PromptBuilder {
    /// Prompt over inline document text.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            flavor: Flavor::Inline(text.into()),
        }
    }

    /// Prompt over an opaque remote file id.
    pub fn handle(file_id: impl Into<String>) -> Self {
        Self {
            flavor: Flavor::Handle(file_id.into()),
        }
    }

    /// Build the complete prompt.
    pub fn build(&self) -> String {
        match &self.flavor {
            Flavor::Inline(text) => {
                let mut prompt = String::from(INLINE_INSTRUCTIONS);
                prompt.push_str("\nInvoice text:\n");
                prompt.push_str(text);
                prompt
            }
            Flavor::Handle(file_id) => format!(
                "Extract the following fields from the invoice with file_id {}: \
                 client_name, invoice_amount, product_name. \
                 Return the invoice_amount as a float. \
                 If a field cannot be determined, return null for it.",
                file_id
            ),
        }
    }
}

const INLINE_INSTRUCTIONS: &str = "Extract the following information from this invoice text: \
1. Client name \
2. Invoice amount \
3. Product name \
Return the result as a JSON object. Do not surround the result with ```json and ``` tags. \
Use the following keys: \
1. client_name (string) \
2. invoice_amount (float) \
3. product_name (string) \
If the information is not found, return 'null' for the corresponding key.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_prompt_names_keys_and_text() {
        let prompt = PromptBuilder::inline("Client: Acme Corp, Amount: $120.00").build();
        assert!(prompt.contains("client_name (string)"));
        assert!(prompt.contains("invoice_amount (float)"));
        assert!(prompt.contains("product_name (string)"));
        assert!(prompt.contains("return 'null'"));
        assert!(prompt.contains("Client: Acme Corp, Amount: $120.00"));
    }

    #[test]
    fn test_handle_prompt_names_file_id() {
        let prompt = PromptBuilder::handle("329181520179").build();
        assert!(prompt.contains("file_id 329181520179"));
        assert!(prompt.contains("client_name, invoice_amount, product_name"));
        assert!(prompt.contains("float"));
    }

    #[test]
    fn test_inline_prompt_is_deterministic() {
        let a = PromptBuilder::inline("same text").build();
        let b = PromptBuilder::inline("same text").build();
        assert_eq!(a, b);
    }
}
