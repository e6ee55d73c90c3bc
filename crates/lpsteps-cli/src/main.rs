use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use lpsteps_solver::{CanonicalForm, Method, Problem, SimplexIteration, Solution, SolutionStatus, Solver, TableData};

#[derive(Parser)]
#[command(name = "lpsteps")]
#[command(about = "Solve linear programs and show every step", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem stored as JSON
    Solve {
        /// The problem file
        file: PathBuf,
        /// Solution method (graphical, simplex, general)
        #[arg(short, long)]
        method: Option<String>,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Maximum pivots per simplex phase
        #[arg(long, default_value_t = 100)]
        max_iterations: usize,
        /// Tolerance for floating point comparisons
        #[arg(long, default_value_t = 1e-8)]
        tolerance: f64,
    },
    /// Check a problem file for errors
    Check {
        /// The problem file
        file: PathBuf,
    },
    /// Print the classroom example problem as JSON
    Example,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            method,
            format,
            max_iterations,
            tolerance,
        } => {
            let problem = load_problem(&file);
            let method = match method.map(|m| m.parse::<Method>()).transpose() {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            let solution = solver.solve(&problem, method);

            if format == "json" {
                match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing solution: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_solution(&solution);
            }

            if !solution.is_valid {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let problem = load_problem(&file);
            match problem.validate() {
                Ok(()) => {
                    println!("✓ {} is valid", file.display());
                    println!(
                        "  {} problem",
                        if problem.is_maximization() { "maximization" } else { "minimization" }
                    );
                    println!("  {} variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                    println!("  default method: {}", Method::default_for(problem.num_variables()));
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Example => match serde_json::to_string_pretty(&Problem::classroom_example()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing example: {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn load_problem(file: &Path) -> Problem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(problem) => problem,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_solution(solution: &Solution) {
    if let Some(ref canonical) = solution.canonical_form {
        print_canonical(canonical);
    }
    if let Some(ref iterations) = solution.iterations {
        for iteration in iterations {
            print_iteration(iteration);
        }
    }
    if !solution.table_data.headers.is_empty() {
        print_table(&solution.table_data);
        println!();
    }
    if let Some(ref region) = solution.feasible_region {
        let vertices: Vec<String> = region.iter().map(|v| format!("({:.2}, {:.2})", v[0], v[1])).collect();
        println!("Feasible region: {}", vertices.join(" -> "));
        println!();
    }

    for message in &solution.messages {
        println!("{}", message);
    }
    println!();

    match solution.status {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            for (i, x) in solution.coordinates.iter().enumerate() {
                println!("  x{:<3} = {:10.4}", i + 1, x);
            }
            println!("  Z    = {:10.4}", solution.value);
            if !solution.active_constraints.is_empty() {
                let active: Vec<String> = solution.active_constraints.iter().map(|i| (i + 1).to_string()).collect();
                println!("Active constraints: {}", active.join(", "));
            }
        }
        other => println!("Status: {}", other.describe().to_uppercase()),
    }
}

fn print_canonical(canonical: &CanonicalForm) {
    for line in &canonical.explanation {
        println!("{}", line);
    }
    let mut headers = canonical.variable_names.clone();
    headers.push("RHS".to_string());
    let rows: Vec<Vec<String>> = canonical
        .constraint_matrix
        .iter()
        .zip(&canonical.right_hand_side)
        .map(|(row, b)| row.iter().chain(std::iter::once(b)).map(|v| cell(*v)).collect::<Vec<String>>())
        .collect();
    print_table(&TableData { headers, rows });
    println!("Initial basis: {}", canonical.basis_variables.join(", "));
    println!();
}

fn print_iteration(iteration: &SimplexIteration) {
    let title = if iteration.iteration == 0 {
        "Initial tableau".to_string()
    } else {
        format!("Iteration {}", iteration.iteration)
    };
    println!("{} [phase {}]", title, iteration.phase);

    let m = iteration.basis.len();
    let mut headers = vec!["Cb".to_string(), "Basis".to_string()];
    headers.extend(iteration.variable_names.iter().cloned());
    headers.push("RHS".to_string());
    if iteration.ratios.is_some() {
        headers.push("Ratio".to_string());
    }

    let mut rows = Vec::with_capacity(m + 2);
    for (i, tableau_row) in iteration.tableau.iter().take(m).enumerate() {
        let mut row = vec![cell(iteration.basis_coefficients[i]), iteration.basis[i].clone()];
        for (j, &value) in tableau_row.iter().enumerate() {
            let marked = iteration.pivot.is_some_and(|p| p.row == i && p.col == j);
            row.push(if marked { format!("[{}]", cell(value)) } else { cell(value) });
        }
        if let Some(ref ratios) = iteration.ratios {
            row.push(ratio_cell(ratios[i]));
        }
        rows.push(row);
    }
    for (label, values) in [("Cj", &iteration.cj_row), ("Δj", &iteration.delta_j_row)] {
        let mut row = vec![String::new(), label.to_string()];
        row.extend(values.iter().map(|v| cell(*v)));
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    print_table(&TableData { headers, rows });

    match (&iteration.entering_variable, &iteration.leaving_variable) {
        (Some(entering), Some(leaving)) => println!("{} enters, {} leaves", entering, leaving),
        (Some(entering), None) => println!("{} enters, no variable can leave", entering),
        _ => {}
    }
    if iteration.is_optimal {
        println!("Optimal, Z = {:.4}", iteration.objective_value);
    }
    println!();
}

fn print_table(table: &TableData) {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (j, value) in row.iter().enumerate() {
            if j < widths.len() {
                widths[j] = widths[j].max(value.chars().count());
            }
        }
    }
    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:>w$}", c, w = w))
            .collect();
        println!("  {}", padded.join(" | "));
    };
    line(table.headers.as_slice());
    println!("  {}", widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("-+-"));
    for row in &table.rows {
        line(row.as_slice());
    }
}

fn cell(value: f64) -> String {
    if value.abs() < 1e-10 {
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
    }
}

fn ratio_cell(ratio: f64) -> String {
    if ratio.is_infinite() {
        "∞".to_string()
    } else if ratio < 0.0 {
        "-".to_string()
    } else {
        cell(ratio)
    }
}
