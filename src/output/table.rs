//! kubectl-style table rendering: columns sized to their widest cell, three
//! spaces between columns, no padding after the last cell of a row.

use std::io;

use unicode_width::UnicodeWidthStr;

use crate::types::{IngressRoute, Route, ServiceKind, ServiceRoute};

use super::NOT_FOUND_MARKER;

const COLUMN_GAP: usize = 3;

pub fn render(route: &Route, out: &mut impl io::Write) -> io::Result<()> {
    match route {
        Route::Service(service) => service_table(service, out),
        Route::Ingress(ingress) => ingress_table(ingress, out),
    }
}

fn service_table(service: &ServiceRoute, out: &mut impl io::Write) -> io::Result<()> {
    let backends_header = match service.kind {
        ServiceKind::ExternalName => "HOSTNAME",
        _ => "POD(S)",
    };

    let header = ["NAME", "TYPE", "PORT(S)", backends_header];
    let row = vec![
        service.name.clone(),
        service.kind.to_string(),
        service.ports_string(),
        service.backends_string(),
    ];

    write_table(&header, &[row], out)
}

fn ingress_table(ingress: &IngressRoute, out: &mut impl io::Write) -> io::Result<()> {
    let backends_header = if ingress.has_external_backend() {
        "POD(S)/HOSTNAME"
    } else {
        "POD(S)"
    };

    let header = [
        "NAME",
        "HOST",
        "PATH",
        "PORT",
        "SERVICE",
        "TYPE",
        "SERVICE PORT(S)",
        backends_header,
    ];

    let mut rows = Vec::new();

    for rule in &ingress.rules {
        for path in &rule.paths {
            let row = match &path.service {
                Some(service) => vec![
                    ingress.name.clone(),
                    rule.host.clone(),
                    path.path.clone(),
                    path.port.to_string(),
                    service.name.clone(),
                    service.kind.to_string(),
                    service.ports_string(),
                    service.backends_string(),
                ],
                None => vec![
                    ingress.name.clone(),
                    rule.host.clone(),
                    path.path.clone(),
                    path.port.to_string(),
                    format!("{}{}", path.service_name, NOT_FOUND_MARKER),
                    String::new(),
                    String::new(),
                    String::new(),
                ],
            };

            rows.push(row);
        }
    }

    write_table(&header, &rows, out)
}

fn write_table(header: &[&str], rows: &[Vec<String>], out: &mut impl io::Write) -> io::Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.width()).collect();

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.width());
        }
    }

    write_row(header.iter().copied(), &widths, out)?;
    for row in rows {
        write_row(row.iter().map(String::as_str), &widths, out)?;
    }

    Ok(())
}

fn write_row<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    out: &mut impl io::Write,
) -> io::Result<()> {
    let last = widths.len() - 1;

    for (idx, cell) in cells.enumerate() {
        if idx == last {
            writeln!(out, "{}", cell)?;
        } else {
            let padded = widths[idx] + COLUMN_GAP;
            write!(out, "{}{}", cell, " ".repeat(padded - cell.width()))?;
        }
    }

    Ok(())
}
