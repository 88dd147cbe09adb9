use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};

use super::client::LlmError;

pub async fn request_single_text_response(
    client: &Client<OpenAIConfig>,
    model: &str,
    temperature: f32,
    prompt: &str,
) -> Result<String, LlmError> {
    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .temperature(temperature)
        .messages(vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ])
        .build()?;

    let response = client.chat().create(request).await?;

    for choice in response.choices {
        if let Some(text) = choice.message.content {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(trimmed.to_string());
        }
    }

    Err(LlmError::EmptyResponse)
}
