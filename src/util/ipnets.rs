/* This file is part of HostRank (https://hostrank.net)
 *
 * Copyright (C) 2023-2026 HostRank developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{collections::HashSet, net::IpAddr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::{Error, Result};

/// Hosts in the same IPv4 /24 share one footprint.
pub const IPV4_PREFIX_LEN: u8 = 24;
/// Hosts in the same IPv6 /54 share one footprint.
pub const IPV6_PREFIX_LEN: u8 = 54;

/// Resolve a `host:port` address to the set of IP networks it lives in.
/// Addresses resolving to multiple A/AAAA records yield multiple networks;
/// duplicates are collapsed.
pub async fn lookup_ip_nets(addr: &str) -> Result<Vec<IpNet>> {
    let resolved =
        smol::net::resolve(addr).await.map_err(|e| Error::AddrResolveFailed(e.to_string()))?;

    let mut nets: Vec<IpNet> = Vec::new();
    for sockaddr in resolved {
        let net = ip_net(sockaddr.ip());
        if !nets.contains(&net) {
            nets.push(net);
        }
    }

    if nets.is_empty() {
        return Err(Error::AddrResolveFailed(format!("no addresses found for {}", addr)))
    }

    Ok(nets)
}

/// Truncate an IP address to its containing footprint network.
pub fn ip_net(ip: IpAddr) -> IpNet {
    match ip {
        IpAddr::V4(ip) => IpNet::V4(Ipv4Net::new(ip, IPV4_PREFIX_LEN).unwrap().trunc()),
        IpAddr::V6(ip) => IpNet::V6(Ipv6Net::new(ip, IPV6_PREFIX_LEN).unwrap().trunc()),
    }
}

/// Compare two footprint sets ignoring order.
pub fn equal_ip_nets(a: &[IpNet], b: &[IpNet]) -> bool {
    if a.len() != b.len() {
        return false
    }
    let set: HashSet<&IpNet> = a.iter().collect();
    b.iter().all(|net| set.contains(net))
}
