use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::cache::GenerationCache;
use crate::error::{GenerationError, GenerationResult};
use crate::export;
use crate::generator::QuizGenerator;
use crate::llm::{ModelClient, OpenAiModelClient, resolve_credential};
use crate::palette::Palette;
use crate::question::{Credential, GenerationRequest, OPTION_LABELS, Question};
use crate::utils::{ask_yn, is_plain_text, pluralize};

const STDIN_PATH: &str = "-";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub paths: Vec<PathBuf>,
    pub topic: Option<String>,
    pub count: usize,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub fresh: bool,
    pub regenerate: bool,
}

struct StudySource {
    label: String,
    text: String,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let sources = read_sources(&options.paths)?;
    let reads_stdin = options.paths.iter().any(|p| p.as_os_str() == STDIN_PATH);
    let (credential, source) = resolve_credential(!reads_stdin)?;
    tracing::debug!(source = source.description(), "using API key");

    let generator = QuizGenerator::new(OpenAiModelClient::new(), Arc::new(GenerationCache::new()));
    let requests = build_requests(&sources, &options, &credential);

    let mut results = if options.fresh {
        regenerate_all(&generator, &requests).await
    } else {
        generator.generate_many(&requests).await
    };

    loop {
        let produced = report(&sources, &results, &options)?;
        if produced == 0 {
            bail!(
                "No questions generated from {}",
                pluralize("source", sources.len())
            );
        }

        if !options.regenerate || options.json || reads_stdin {
            break;
        }
        if !ask_yn("Regenerate the questions with different wording?".to_string())? {
            break;
        }
        results = regenerate_all(&generator, &requests).await;
    }

    Ok(())
}

async fn regenerate_all<C: ModelClient>(
    generator: &QuizGenerator<C>,
    requests: &[GenerationRequest],
) -> Vec<GenerationResult<Arc<[Question]>>> {
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        results.push(generator.regenerate(request).await);
    }
    results
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<StudySource>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        if path.as_os_str() == STDIN_PATH {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read study material from stdin")?;
            sources.push(StudySource {
                label: "stdin".to_string(),
                text,
            });
            continue;
        }

        if !is_plain_text(path) {
            bail!("Study material must be a .txt file: {}", path.display());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        sources.push(StudySource {
            label: path.display().to_string(),
            text,
        });
    }
    Ok(sources)
}

fn build_requests(
    sources: &[StudySource],
    options: &GenerateOptions,
    credential: &Credential,
) -> Vec<GenerationRequest> {
    sources
        .iter()
        .map(|source| {
            GenerationRequest::new(
                source.text.clone(),
                options.topic.clone(),
                options.count,
                credential.clone(),
            )
        })
        .collect()
}

/// Prints or exports every result and returns how many sources succeeded.
fn report(
    sources: &[StudySource],
    results: &[GenerationResult<Arc<[Question]>>],
    options: &GenerateOptions,
) -> Result<usize> {
    let topic = options.topic.as_deref();
    let mut export_text = String::new();
    let mut json_sets = Vec::new();
    let mut produced = 0;

    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(questions) => {
                produced += 1;
                if options.json {
                    json_sets.push(export::QuestionSet {
                        source: &source.label,
                        questions,
                    });
                } else {
                    print_questions(&source.label, questions, options.count);
                }
                let title = if sources.len() > 1 {
                    format!("{} ({})", export::title(topic), source.label)
                } else {
                    export::title(topic)
                };
                export_text.push_str(&export::to_plain_text(&title, questions));
            }
            Err(err) => print_failure(&source.label, err),
        }
    }

    if options.json {
        print!("{}", export::to_json(&json_sets)?);
    }

    if let Some(output) = &options.output
        && produced > 0
    {
        let path = resolve_output_path(output, topic);
        export::write_text(&path, &export_text)?;
        if !options.json {
            println!(
                "Saved questions to {}",
                Palette::paint(Palette::ACCENT, path.display())
            );
        }
    }

    Ok(produced)
}

/// A directory output gets the default file name inside it.
fn resolve_output_path(output: &Path, topic: Option<&str>) -> PathBuf {
    if output.is_dir() {
        output.join(export::default_file_name(topic))
    } else {
        output.to_path_buf()
    }
}

fn print_questions(label: &str, questions: &[Question], requested: usize) {
    println!(
        "\n{} {} from {}",
        Palette::paint(Palette::SUCCESS, "Generated"),
        pluralize_count(questions.len(), requested),
        Palette::paint(Palette::ACCENT, label)
    );

    for (idx, question) in questions.iter().enumerate() {
        println!(
            "\n{} {}",
            Palette::bold(format!("Question {}:", idx + 1)),
            question.prompt()
        );
        for (option_idx, (label, option)) in OPTION_LABELS.iter().zip(question.options()).enumerate()
        {
            if option_idx == question.correct_index() {
                println!("  {}", Palette::paint(Palette::SUCCESS, format!("{label}) {option}")));
            } else {
                println!("  {label}) {option}");
            }
        }
        println!(
            "  {} {}",
            Palette::paint(Palette::INFO, "Explanation:"),
            Palette::dim(question.explanation())
        );
    }
}

fn pluralize_count(got: usize, requested: usize) -> String {
    let got_str = pluralize("question", got);
    if got < requested {
        format!(
            "{} {}",
            got_str,
            Palette::paint(Palette::WARNING, format!("(of {requested} requested)"))
        )
    } else {
        got_str
    }
}

fn print_failure(label: &str, err: &GenerationError) {
    eprintln!(
        "\n{} {}: {}",
        Palette::paint(Palette::DANGER, "Failed"),
        Palette::paint(Palette::ACCENT, label),
        err
    );
    eprintln!("{}", Palette::dim(err.hint()));
}
