use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use livestock_pedigree_core::genetics::{
    format_report, inbreeding_report, Coefficient, ConsanguinityEngine, CycleDiagnostic,
    EngineConfig, MatingAssessment, Pedigree,
};

#[derive(Parser)]
#[command(name = "consang")]
#[command(version)]
#[command(about = "Inbreeding and relationship coefficients for livestock pedigrees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct Common {
    /// Path to pedigree CSV (columns: animal, sire, dam, optional sex, active)
    #[arg(short, long)]
    pedigree: String,

    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// Maximum recursion depth per query (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Offspring inbreeding above which a mating is flagged (fraction)
    #[arg(long, default_value = "0.125")]
    warning_threshold: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Coefficient of inbreeding of one animal
    Inbreeding {
        #[command(flatten)]
        common: Common,

        /// Animal identifier
        animal: String,
    },

    /// Coefficient of relationship between two animals
    Relationship {
        #[command(flatten)]
        common: Common,

        /// First animal identifier
        a: String,

        /// Second animal identifier
        b: String,
    },

    /// Check a proposed mating before recording it
    Mating {
        #[command(flatten)]
        common: Common,

        /// Sire identifier
        sire: String,

        /// Dam identifier
        dam: String,
    },

    /// Recompute inbreeding for every animal and list the inbred ones
    Report {
        #[command(flatten)]
        common: Common,

        /// List every animal, including those with F = 0
        #[arg(long)]
        all: bool,
    },

    /// List descendants of an animal (whose inbreeding changes if its parents are edited)
    Descendants {
        /// Path to pedigree CSV
        #[arg(short, long)]
        pedigree: String,

        /// Animal identifier
        animal: String,

        /// Number of generations to walk (all when omitted)
        #[arg(long)]
        generations: Option<usize>,
    },

    /// Check the pedigree for self-parentage, sex mismatches and cycles
    Validate {
        /// Path to pedigree CSV
        #[arg(short, long)]
        pedigree: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inbreeding { common, animal } => cmd_inbreeding(&common, &animal),
        Commands::Relationship { common, a, b } => cmd_relationship(&common, &a, &b),
        Commands::Mating { common, sire, dam } => cmd_mating(&common, &sire, &dam),
        Commands::Report { common, all } => cmd_report(&common, all),
        Commands::Descendants {
            pedigree,
            animal,
            generations,
        } => cmd_descendants(&pedigree, &animal, generations),
        Commands::Validate { pedigree } => cmd_validate(&pedigree),
    }
}

fn load_pedigree(path: &str) -> Result<Pedigree> {
    let ped = Pedigree::from_csv(path)
        .with_context(|| format!("Failed to load pedigree from '{}'", path))?;
    eprintln!("Loaded pedigree with {} animals from '{}'", ped.n_animals(), path);
    Ok(ped)
}

fn engine_config(common: &Common) -> EngineConfig {
    let mut config = EngineConfig::new().warning_threshold(common.warning_threshold);
    if let Some(depth) = common.max_depth {
        config = config.max_depth(depth);
    }
    config
}

fn is_json(common: &Common) -> bool {
    common.format.eq_ignore_ascii_case("json")
}

fn cmd_inbreeding(common: &Common, animal: &str) -> Result<()> {
    let ped = load_pedigree(&common.pedigree)?;
    let engine = ConsanguinityEngine::with_config(&ped, engine_config(common))?;
    let f = engine
        .inbreeding_coefficient(animal)
        .with_context(|| format!("Failed to compute inbreeding of '{}'", animal))?;

    if is_json(common) {
        let mut value = coefficient_json(&f);
        value["animal"] = serde_json::json!(animal);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "F({}) = {:.5}  ({:.4} %, {} risk)",
            animal,
            f.value,
            f.percent(),
            f.risk()
        );
        print_diagnostics(&f.diagnostics);
    }
    Ok(())
}

fn cmd_relationship(common: &Common, a: &str, b: &str) -> Result<()> {
    let ped = load_pedigree(&common.pedigree)?;
    let engine = ConsanguinityEngine::with_config(&ped, engine_config(common))?;
    let r = engine
        .relationship_coefficient(a, b)
        .with_context(|| format!("Failed to compute relationship of '{}' and '{}'", a, b))?;

    if is_json(common) {
        let mut value = coefficient_json(&r);
        value["a"] = serde_json::json!(a);
        value["b"] = serde_json::json!(b);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("R({}, {}) = {:.5}", a, b, r.value);
        print_diagnostics(&r.diagnostics);
    }
    Ok(())
}

fn cmd_mating(common: &Common, sire: &str, dam: &str) -> Result<()> {
    let ped = load_pedigree(&common.pedigree)?;
    let engine = ConsanguinityEngine::with_config(&ped, engine_config(common))?;
    let assessment = engine
        .assess_mating(sire, dam)
        .with_context(|| format!("Failed to assess mating of '{}' and '{}'", sire, dam))?;

    if is_json(common) {
        println!("{}", serde_json::to_string_pretty(&mating_json(&assessment))?);
    } else {
        print!("{}", assessment.summary());
    }
    Ok(())
}

fn cmd_report(common: &Common, all: bool) -> Result<()> {
    let ped = load_pedigree(&common.pedigree)?;
    let engine = ConsanguinityEngine::with_config(&ped, engine_config(common))?;

    let batch = engine.inbreeding_all();
    for (id, err) in &batch.failures {
        eprintln!("Warning: could not evaluate '{}': {}", id, err);
    }

    let records = if all {
        batch.records
    } else {
        inbreeding_report(&batch.records)
    };

    if is_json(common) {
        let rows: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                let mut value = coefficient_json(&r.coefficient);
                value["animal"] = serde_json::json!(r.id);
                value
            })
            .collect();
        let failures: Vec<serde_json::Value> = batch
            .failures
            .iter()
            .map(|(id, err)| serde_json::json!({ "animal": id, "error": err.to_string() }))
            .collect();
        let out = serde_json::json!({ "animals": rows, "failures": failures });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_report(&records));
    }
    Ok(())
}

fn cmd_descendants(pedigree_path: &str, animal: &str, generations: Option<usize>) -> Result<()> {
    let ped = load_pedigree(pedigree_path)?;
    let descendants = ped
        .descendants(animal, generations)
        .with_context(|| format!("Failed to list descendants of '{}'", animal))?;

    eprintln!("{} descendants of '{}'", descendants.len(), animal);
    for id in &descendants {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_validate(pedigree_path: &str) -> Result<()> {
    let ped = load_pedigree(pedigree_path)?;
    let issues = ped.issues();

    if issues.is_empty() {
        println!("Pedigree OK: {} animals, no issues found", ped.n_animals());
        return Ok(());
    }

    for issue in &issues {
        println!("  {}", issue);
    }
    anyhow::bail!("{} pedigree issue(s) found", issues.len());
}

fn print_diagnostics(diagnostics: &[CycleDiagnostic]) {
    for diag in diagnostics {
        eprintln!("Warning: {} (pedigree needs correction)", diag);
    }
}

fn diagnostics_json(diagnostics: &[CycleDiagnostic]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "kind": d.kind.as_str(),
                "individuals": d.individuals,
            })
        })
        .collect();
    serde_json::json!(items)
}

fn coefficient_json(c: &Coefficient) -> serde_json::Value {
    serde_json::json!({
        "value": c.value,
        "percent": c.percent(),
        "risk": c.risk().as_str(),
        "diagnostics": diagnostics_json(&c.diagnostics),
        "evaluations": {
            "inbreeding": c.stats.inbreeding_evaluations,
            "relationship": c.stats.relationship_evaluations,
            "cache_hits": c.stats.cache_hits,
        },
    })
}

fn mating_json(m: &MatingAssessment) -> serde_json::Value {
    serde_json::json!({
        "sire": m.sire,
        "dam": m.dam,
        "relationship": m.relationship,
        "offspring_inbreeding": m.offspring_inbreeding,
        "risk": m.risk.as_str(),
        "warning": m.warning,
        "diagnostics": diagnostics_json(&m.diagnostics),
    })
}
