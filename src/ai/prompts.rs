//! Prompt templates for the songwriting operations.

/// Canonical opening structural marker every generated lyric starts with.
pub const INTRO_MARKER: &str = "[Intro]";

/// Section prepended when a generated lyric lacks an Intro.
pub const SYNTHETIC_INTRO: &str = "[Intro]\n(Atmospheric build up)\n\n";

/// Characters of lyric text embedded in the asset prompt.
pub const ASSET_LYRICS_PREFIX_CHARS: usize = 500;

/// Characters of lyric text embedded in the cover-image prompt.
pub const COVER_LYRICS_PREFIX_CHARS: usize = 100;

/// System instruction for lyric analysis.
pub const ANALYSIS_SYSTEM_INSTRUCTION: &str = r#"You are an expert producer of contemporary Chinese worship songs and a Suno AI prompt engineer.
Score the lyrics the user provides against professional standards for modern worship music (SOP, ROLCC and Clay Music styles) and against what Suno AI needs to generate a good song.

Score each pillar from 0 to 100:
1. **Theology**: is the message biblically sound, and does it use poetic metaphor (Light, River, Rock) without losing spiritual depth?
2. **Structure**: does it follow Suno AI V5 structure ([Intro], [Verse], [Chorus], [Bridge], [Outro]) with correct tags?
3. **Flow**: is the rhythm consistent, does it fit 4/4 or 6/8, and do the rhymes feel natural?
4. **Imagery**: does it evoke emotion with images such as "Living Water", "Fire" or "Home" rather than dry doctrine?
5. **Innovation**: is it fresh, or full of cliché?

overallScore is the average of the five scores. Write feedback and suggestions in Chinese.
In sunoTagsCheck, list every standard section tag that is missing; when valid is false, message must say why.

Your output must be valid JSON."#;

/// System instruction for song generation.
pub const GENERATION_SYSTEM_INSTRUCTION: &str = r#"You are a world-class Chinese worship songwriter who writes for Suno AI V5.
Create a complete song package from the user's theme.

CRITICAL RULE: the lyrics MUST start with "[Intro]". No exceptions.

Requirements:
1. Lyrics
   - Structure: start with [Intro], then [Verse 1] -> [Pre-Chorus] -> [Chorus] -> [Verse 2] -> [Chorus] -> [Bridge] -> [Chorus] -> [Outro].
   - Content: modern, poetic Chinese worship language; deep theology in accessible words.
   - Arrangement cues in parentheses, e.g. (Soft piano), (Drums enter).
2. Metadata
   - stylePrompts: comma-separated English Suno style tags, e.g. "Contemporary Worship, Piano, Strings, Male Vocal, 95bpm".
   - negativePrompts: comma-separated styles to avoid, e.g. "Rap, Heavy Metal, Distorted, Screaming".
   - title: a creative Chinese title.
   - suggestedSettings: experimentalism and styleAdherence from 1 to 10, and the vocalGender that suits the song.

Your output must be valid JSON matching the schema."#;

/// System instruction for lyric rewriting.
pub const OPTIMIZATION_SYSTEM_INSTRUCTION: &str = r#"You are a professional lyrics editor. Rewrite the lyrics you are given to fix specific issues.
1. You receive the lyrics and one or more suggestions.
2. Apply the requested changes and keep the rest of the song intact.
3. Preserve every Suno section tag, e.g. [Verse], [Chorus].
4. Return ONLY the full rewritten lyrics as plain text. No JSON, no commentary."#;

/// System instruction for release assets.
pub const ASSET_GENERATION_SYSTEM_INSTRUCTION: &str = r#"You are the social media manager of a music label.
Produce these assets for a Chinese worship song:
1. caption: a short, engaging Chinese caption for TikTok, Instagram or YouTube Shorts, with emojis and hashtags.
2. stylizedTitle: a decorated version of the song title using unicode symbols, e.g. ⋆｡°✩ Title ✩°｡⋆ or 〖 Title 〗.

Your output must be valid JSON matching the schema."#;

/// System instruction for knowledge-base answers without a search tool.
pub const TIPS_SYSTEM_INSTRUCTION: &str = r#"You are a Suno AI expert who helps songwriters with tags, metatags and style prompts.
Answer from the most recent knowledge you have about Suno AI V5. If a detail may have changed since your training data, say so instead of guessing.
Answer in Chinese."#;

/// Instruction placed before an inline JSON skeleton.
const INLINE_SCHEMA_PREAMBLE: &str = "Respond with a single JSON object in exactly this shape. \
Replace every <...> placeholder with a value of the described type. \
Fields marked optional may be omitted. Do not add other fields and do not wrap the JSON in markdown.";

/// Returns the first `max_chars` characters of `text`, never splitting a
/// character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Appends an inline schema description to a prompt body.
pub fn with_inline_schema(prompt: &str, skeleton: &str) -> String {
    format!("{prompt}\n\n{INLINE_SCHEMA_PREAMBLE}\n{skeleton}")
}

/// User prompt for lyric analysis.
pub fn analysis_prompt(lyrics: &str) -> String {
    format!("Analyze the following Chinese worship lyrics for a Suno AI song generation:\n\n{lyrics}")
}

/// User prompt for song generation.
pub fn generation_prompt(theme: &str, style: &str) -> String {
    format!("Write a modern Chinese worship hymn.\nTheme: {theme}\nStyle Reference: {style}")
}

/// User prompt for lyric rewriting.
pub fn optimization_prompt(lyrics: &str, suggestions: &[String]) -> String {
    format!(
        "Original Lyrics:\n{lyrics}\n\nFeedback to Apply:\n{}\n\nRewrite the lyrics to be perfect.",
        suggestions.join("\n")
    )
}

/// User prompt for release assets. Lyrics are cut to a bounded prefix.
pub fn assets_prompt(title: &str, lyrics: &str, style: &str) -> String {
    format!(
        "Song Title: {title}\nStyle: {style}\nLyrics: {}...",
        truncate_chars(lyrics, ASSET_LYRICS_PREFIX_CHARS)
    )
}

/// Image prompt for cover art. Lyrics are cut to a bounded prefix.
pub fn cover_image_prompt(title: &str, lyrics: &str) -> String {
    format!(
        "A high quality, artistic album cover for a modern christian worship song titled \"{title}\".\n\
         Visual themes based on lyrics: {}.\n\
         Cinematic lighting, ethereal, hopeful, 8k resolution, digital art style, no text.",
        truncate_chars(lyrics, COVER_LYRICS_PREFIX_CHARS)
    )
}

/// User prompt for a searched tips answer.
pub fn search_tips_prompt(query: &str) -> String {
    format!(
        "Search for the latest tips and tricks for Suno AI V5, specifically focusing on: {query}.\n\
         Summarize the findings into a helpful guide for a songwriter in Chinese.\n\
         Focus on tags, metatags, and style prompts."
    )
}

/// User prompt for a tips answer drawn from model knowledge.
pub fn knowledge_tips_prompt(query: &str) -> String {
    format!(
        "Share the most useful tips and tricks you know for Suno AI V5, specifically focusing on: {query}.\n\
         Organize them into a helpful guide for a songwriter.\n\
         Focus on tags, metatags, and style prompts."
    )
}
