/// System message framing the model as a meeting-notes summarizer.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in summarizing meeting notes and transcripts.\n\
Your task is to create structured, professional summaries based on the user's specific instructions.\n\
Always maintain accuracy and include important details while following the requested format.";

/// Prompt used by connection checks.
pub const PING_PROMPT: &str = "Hello, respond with 'OK' if you can hear me.";

/// Build the user message: the instruction is repeated after the transcript
/// so long inputs don't bury it.
pub fn build_summary_prompt(transcript: &str, instruction: &str) -> String {
    format!(
        "Please analyze the following meeting transcript and create a summary based on these specific instructions: \"{instruction}\"\n\
\n\
Meeting Transcript:\n\
{transcript}\n\
\n\
Instructions: {instruction}\n\
\n\
Please provide a well-structured summary that follows the given instructions exactly."
    )
}
